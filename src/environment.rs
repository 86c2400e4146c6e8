use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// One lexical scope: a flat map of names to values, plus a link to the
/// scope it's nested in. Variable resolution walks this chain outward;
/// the resolver precomputes how many links to walk so `get`/`assign`
/// don't need to search when a distance is already known (see `get_at`/`assign_at`).
#[derive(Debug)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    pub variables: HashMap<String, Object>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment { enclosing, variables: HashMap::new() }
    }

    pub fn define(&mut self, name: &str, value: Object) {
        self.variables.insert(name.to_string(), value);
    }

    fn ancestor(env: Rc<RefCell<Environment>>, distance: usize) -> Rc<RefCell<Environment>> {
        let mut environment = env;

        for _ in 0..distance {
            let parent = environment
                .borrow()
                .enclosing
                .clone()
                .expect("resolver-computed distance to stay within the environment chain");
            environment = parent;
        }

        environment
    }

    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.variables.contains_key(&name.lexeme) {
            self.variables.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }

    pub fn assign_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &Token, value: Object) {
        Self::ancestor(Rc::clone(env), distance)
            .borrow_mut()
            .variables
            .insert(name.lexeme.clone(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(value) = self.variables.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }

    pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &Token) -> Result<Object, RuntimeError> {
        let target = Self::ancestor(Rc::clone(env), distance);
        let value = target.borrow().variables.get(&name.lexeme).cloned();

        value.ok_or_else(|| RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::Literal;
    use crate::token::TokenKind;

    fn token(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name.to_string(), None, 1)
    }

    #[test]
    fn defines_and_reads_in_same_scope() {
        let mut env = Environment::default();
        env.define("a", Object::Literal(Literal::Number(1.0)));
        assert_eq!(env.get(&token("a")).unwrap(), Object::Literal(Literal::Number(1.0)));
    }

    #[test]
    fn reads_fall_through_to_enclosing_scope() {
        let outer = Rc::new(RefCell::new(Environment::default()));
        outer.borrow_mut().define("a", Object::Literal(Literal::Number(1.0)));

        let inner = Environment::new(Some(Rc::clone(&outer)));
        assert_eq!(inner.get(&token("a")).unwrap(), Object::Literal(Literal::Number(1.0)));
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        let env = Environment::default();
        assert!(env.get(&token("missing")).is_err());
    }

    #[test]
    fn assign_requires_prior_definition() {
        let mut env = Environment::default();
        assert!(env.assign(&token("a"), Object::Literal(Literal::Nil)).is_err());
    }

    #[test]
    fn get_at_skips_directly_to_ancestor() {
        let global = Rc::new(RefCell::new(Environment::default()));
        global.borrow_mut().define("a", Object::Literal(Literal::Number(1.0)));

        let middle = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&global)))));
        let inner = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&middle)))));

        let value = Environment::get_at(&inner, 2, &token("a")).unwrap();
        assert_eq!(value, Object::Literal(Literal::Number(1.0)));
    }
}
