use std::cell::RefCell;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::interpreter::{Flow, Interpreter};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::FunctionData;
use crate::token::{Token, TokenKind};

/// A user-defined function or method: declaration plus the environment
/// captured at its point of definition (its closure).
///
/// The declaration is shared behind an `Rc` so binding a method to a
/// receiver — or passing the function around as a value — clones a pointer
/// rather than the whole body.
#[derive(Debug, Clone)]
pub struct Function {
    declaration: Rc<FunctionData>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionData>, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        Function { declaration, closure, is_initializer }
    }

    /// Returns a function value whose closure has an extra scope defining
    /// `this` as the receiving instance. This is what "bound method" means.
    pub fn bind(&self, instance: Object) -> Function {
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.closure)))));
        environment.borrow_mut().define("this", instance);
        Function {
            declaration: Rc::clone(&self.declaration),
            closure: environment,
            is_initializer: self.is_initializer,
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.declaration, &other.declaration) && Rc::ptr_eq(&self.closure, &other.closure)
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.closure)))));
        for (param, arg) in self.declaration.params.iter().zip(arguments) {
            environment.borrow_mut().define(&param.lexeme, arg);
        }

        let flow = interpreter.execute_block(&self.declaration.body, environment)?;

        if self.is_initializer {
            // An initializer always yields `this`, whether it returned
            // explicitly or fell off the end of its body.
            let this_token = Token::new(TokenKind::This, "this".to_string(), None, self.declaration.name.line);
            return Environment::get_at(&self.closure, 0, &this_token);
        }

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Object::Literal(Literal::Nil)),
        }
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

/// A function implemented in Rust rather than Lox, bound into the global
/// environment at interpreter startup.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    arity: usize,
    function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl NativeFunction {
    /// The native bindings wired into every fresh [`Interpreter`]: `clock`
    /// (wall-clock seconds, per spec) and `input` (a line read from stdin),
    /// a natural complement to `print` for an interactive interpreter.
    pub fn globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                function: |_, _| {
                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .expect("system clock to read after the Unix epoch")
                        .as_secs_f64();
                    Ok(Object::from(now))
                },
            },
            NativeFunction {
                name: "input".to_string(),
                arity: 0,
                function: |_, _| {
                    let mut line = String::new();
                    std::io::stdin().read_line(&mut line).map_err(|error| RuntimeError {
                        token: Token::new(TokenKind::Identifier, "input".to_string(), None, 0),
                        message: format!("Failed to read from stdin: {error}"),
                    })?;
                    if line.ends_with('\n') {
                        line.pop();
                        if line.ends_with('\r') {
                            line.pop();
                        }
                    }
                    Ok(Object::from(line))
                },
            },
        ]
    }
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_functions_are_zero_arity() {
        for native in NativeFunction::globals() {
            assert_eq!(native.arity(), 0);
        }
    }

    #[test]
    fn native_functions_compare_by_name() {
        let globals = NativeFunction::globals();
        assert_eq!(globals[0], globals[0].clone());
        assert_ne!(globals[0], globals[1]);
    }
}
