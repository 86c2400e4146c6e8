use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::Function;
use crate::object::Object;
use crate::token::Token;

/// Immutable: a name, an optional superclass, and its own methods (not
/// including inherited ones — those are reached by walking `superclass`).
#[derive(Clone)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<RefCell<Class>>>,
    pub methods: HashMap<String, Function>,
}

impl Class {
    pub fn new(name: String, superclass: Option<Rc<RefCell<Class>>>, methods: HashMap<String, Function>) -> Self {
        Class { name, superclass, methods }
    }

    /// Looks up a method on this class, falling back to the superclass
    /// chain. Returns an unbound [`Function`]; binding to a receiver is the
    /// caller's job (see [`Instance::get`] and `super.METHOD` evaluation).
    pub fn get_method(&self, name: &str) -> Option<Function> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        self.superclass.as_ref().and_then(|superclass| superclass.borrow().get_method(name))
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A class reference plus a mutable map of field name to value. Created
/// only by invoking a class as a callable.
#[derive(Clone)]
pub struct Instance {
    pub class: Rc<RefCell<Class>>,
    pub fields: HashMap<String, Object>,
}

impl Instance {
    pub fn new(class: Rc<RefCell<Class>>) -> Self {
        Instance { class, fields: HashMap::new() }
    }

    /// Field lookup takes precedence over methods. A method found this way
    /// comes back bound to `instance` — its closure gains a `this` scope.
    pub fn get(&self, name: &Token, instance: &Object) -> Result<Object, RuntimeError> {
        if let Some(field) = self.fields.get(&name.lexeme) {
            return Ok(field.clone());
        }

        match self.class.borrow().get_method(&name.lexeme) {
            Some(method) => Ok(Object::Function(method.bind(instance.clone()))),
            None => Err(RuntimeError {
                token: name.clone(),
                message: format!("Undefined property '{}'.", name.lexeme),
            }),
        }
    }

    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<instance {}>", self.class.borrow().name)
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class.borrow().name)
    }
}
