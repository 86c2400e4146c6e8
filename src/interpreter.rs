use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::expr::{self, Expr, ExprId, ExprKind};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{self, Stmt};
use crate::token::{Token, TokenKind};

/// The non-error result of executing a statement: either it ran to
/// completion, or a `return` fired and is unwinding toward the nearest
/// function call. Kept as a dedicated variant (not a second error type
/// smuggled through `Result`'s `Err` arm) so a genuine runtime error and
/// this purely-structural control signal are never conflated.
#[derive(Debug, Clone)]
pub enum Flow {
    Normal,
    Return(Object),
}

type ExecResult = Result<Flow, RuntimeError>;
type EvalResult = Result<Object, RuntimeError>;

/// Post-order tree-walking evaluator. Holds the live environment chain, the
/// resolver's expression-id → depth side table, and the output sink that
/// `print` writes to.
pub struct Interpreter {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    output: Box<dyn Write>,
}

impl Interpreter {
    pub fn new(output: Box<dyn Write>) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));
        for native in NativeFunction::globals() {
            let name = native.name.clone();
            globals.borrow_mut().define(&name, Object::NativeFunction(native));
        }

        Interpreter { environment: Rc::clone(&globals), globals, locals: HashMap::new(), output }
    }

    /// Merges in a fresh batch of resolver output. Expression ids are
    /// globally unique across an interpreter's whole lifetime (the driver
    /// hands out a running counter across REPL lines), so this never
    /// overwrites an entry a still-live closure depends on.
    pub fn resolve(&mut self, locals: HashMap<ExprId, usize>) {
        self.locals.extend(locals);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::Expression(data) => {
                self.evaluate(&data.expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Print(data) => {
                let value = self.evaluate(&data.expr)?;
                writeln!(self.output, "{value}").expect("write to output sink");
                Ok(Flow::Normal)
            }
            Stmt::Var(data) => {
                let value = match &data.initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Object::Literal(Literal::Nil),
                };
                self.environment.borrow_mut().define(&data.name.lexeme, value);
                Ok(Flow::Normal)
            }
            Stmt::Block(data) => {
                let enclosing = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
                self.execute_block(&data.statements, enclosing)
            }
            Stmt::If(data) => {
                if self.evaluate(&data.condition)?.is_truthy() {
                    self.execute(&data.then_branch)
                } else if let Some(else_branch) = &data.else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While(data) => {
                while self.evaluate(&data.condition)?.is_truthy() {
                    match self.execute(&data.body)? {
                        Flow::Normal => {}
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Function(declaration) => {
                let function = Function::new(Rc::clone(declaration), Rc::clone(&self.environment), false);
                self.environment.borrow_mut().define(&declaration.name.lexeme, Object::Function(function));
                Ok(Flow::Normal)
            }
            Stmt::Return(data) => {
                let value = match &data.value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Object::Literal(Literal::Nil),
                };
                Ok(Flow::Return(value))
            }
            Stmt::Class(data) => self.execute_class(data),
        }
    }

    /// Runs `statements` with `environment` installed as the current scope,
    /// restoring the previous one on the way out. Shared by block execution
    /// and user-function calls.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> ExecResult {
        let previous = std::mem::replace(&mut self.environment, environment);

        let result = (|| {
            for statement in statements {
                match self.execute(statement)? {
                    Flow::Normal => {}
                    ret @ Flow::Return(_) => return Ok(ret),
                }
            }
            Ok(Flow::Normal)
        })();

        self.environment = previous;
        result
    }

    fn execute_class(&mut self, data: &stmt::ClassData) -> ExecResult {
        let superclass = match &data.superclass {
            Some(expr) => match self.evaluate(expr)? {
                Object::Class(class) => Some(class),
                _ => {
                    return Err(RuntimeError {
                        token: superclass_name_token(expr),
                        message: "Superclass must be a class.".to_string(),
                    });
                }
            },
            None => None,
        };

        // Pre-declare as nil so a method closure that captures the current
        // environment can see the class name's slot even before the class
        // value itself exists (the class is reachable only via this slot,
        // never the other way round, so no reference cycle forms).
        self.environment.borrow_mut().define(&data.name.lexeme, Object::Literal(Literal::Nil));

        let method_scope = if let Some(superclass) = &superclass {
            let scope = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
            scope.borrow_mut().define("super", Object::Class(Rc::clone(superclass)));
            scope
        } else {
            Rc::clone(&self.environment)
        };

        let mut methods = HashMap::new();
        for method in &data.methods {
            let function = Function::new(
                Rc::clone(method),
                Rc::clone(&method_scope),
                method.name.lexeme == "init",
            );
            methods.insert(method.name.lexeme.clone(), function);
        }

        let class = Rc::new(RefCell::new(Class::new(data.name.lexeme.clone(), superclass, methods)));

        self.environment
            .borrow_mut()
            .assign(&data.name, Object::Class(class))
            .expect("class name was just pre-declared in this same environment");

        Ok(Flow::Normal)
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(Object::Literal(literal.clone())),
            ExprKind::Grouping(inner) => self.evaluate(inner),
            ExprKind::Unary(data) => self.evaluate_unary(data),
            ExprKind::Binary(data) => self.evaluate_binary(data),
            ExprKind::Logical(data) => self.evaluate_logical(data),
            ExprKind::Variable(data) => self.lookup_variable(expr.id, &data.name),
            ExprKind::Assign(data) => self.evaluate_assign(expr.id, data),
            ExprKind::Call(data) => self.evaluate_call(data),
            ExprKind::Get(data) => self.evaluate_get(data),
            ExprKind::Set(data) => self.evaluate_set(data),
            ExprKind::This(data) => self.lookup_variable(expr.id, &data.keyword),
            ExprKind::Super(data) => self.evaluate_super(expr.id, data),
        }
    }

    fn lookup_variable(&self, id: ExprId, name: &Token) -> EvalResult {
        match self.locals.get(&id) {
            Some(distance) => Environment::get_at(&self.environment, *distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn evaluate_assign(&mut self, id: ExprId, data: &expr::AssignData) -> EvalResult {
        let value = self.evaluate(&data.value)?;

        match self.locals.get(&id) {
            Some(distance) => Environment::assign_at(&self.environment, *distance, &data.name, value.clone()),
            None => self.globals.borrow_mut().assign(&data.name, value.clone())?,
        }

        Ok(value)
    }

    fn evaluate_unary(&mut self, data: &expr::UnaryData) -> EvalResult {
        let right = self.evaluate(&data.right)?;

        match data.operator.kind {
            TokenKind::Minus => Ok(Object::from(-self.as_number(&data.operator, &right)?)),
            TokenKind::Bang => Ok(Object::from(!right.is_truthy())),
            _ => unreachable!("the parser only ever builds Unary with '-' or '!'"),
        }
    }

    fn evaluate_binary(&mut self, data: &expr::BinaryData) -> EvalResult {
        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;
        let op = &data.operator;

        match op.kind {
            TokenKind::Greater => Ok(Object::from(self.as_number(op, &left)? > self.as_number(op, &right)?)),
            TokenKind::GreaterEqual => Ok(Object::from(self.as_number(op, &left)? >= self.as_number(op, &right)?)),
            TokenKind::Less => Ok(Object::from(self.as_number(op, &left)? < self.as_number(op, &right)?)),
            TokenKind::LessEqual => Ok(Object::from(self.as_number(op, &left)? <= self.as_number(op, &right)?)),
            TokenKind::BangEqual => Ok(Object::from(left != right)),
            TokenKind::EqualEqual => Ok(Object::from(left == right)),
            TokenKind::Minus => Ok(Object::from(self.as_number(op, &left)? - self.as_number(op, &right)?)),
            TokenKind::Slash => Ok(Object::from(self.as_number(op, &left)? / self.as_number(op, &right)?)),
            TokenKind::Star => Ok(Object::from(self.as_number(op, &left)? * self.as_number(op, &right)?)),
            TokenKind::Plus => match (&left, &right) {
                (Object::Literal(Literal::Number(a)), Object::Literal(Literal::Number(b))) => Ok(Object::from(a + b)),
                (Object::Literal(Literal::String(a)), Object::Literal(Literal::String(b))) => {
                    Ok(Object::from(format!("{a}{b}")))
                }
                _ => Err(RuntimeError {
                    token: op.clone(),
                    message: "Operands must be two numbers or two strings.".to_string(),
                }),
            },
            _ => unreachable!("the parser only ever builds Binary with one of the operators above"),
        }
    }

    fn as_number(&self, token: &Token, value: &Object) -> Result<f64, RuntimeError> {
        match value {
            Object::Literal(Literal::Number(n)) => Ok(*n),
            _ => Err(RuntimeError { token: token.clone(), message: "Operand must be a number.".to_string() }),
        }
    }

    fn evaluate_logical(&mut self, data: &expr::LogicalData) -> EvalResult {
        let left = self.evaluate(&data.left)?;

        match data.operator.kind {
            TokenKind::Or if left.is_truthy() => Ok(left),
            TokenKind::And if !left.is_truthy() => Ok(left),
            _ => self.evaluate(&data.right),
        }
    }

    fn evaluate_call(&mut self, data: &expr::CallData) -> EvalResult {
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        if !matches!(callee, Object::Function(_) | Object::NativeFunction(_) | Object::Class(_)) {
            return Err(RuntimeError {
                token: data.paren.clone(),
                message: "Can only call functions and classes.".to_string(),
            });
        }

        if arguments.len() != callee.arity() {
            return Err(RuntimeError {
                token: data.paren.clone(),
                message: format!("Expected {} arguments but got {}.", callee.arity(), arguments.len()),
            });
        }

        callee.call(self, arguments)
    }

    fn evaluate_get(&mut self, data: &expr::GetData) -> EvalResult {
        let object = self.evaluate(&data.object)?;

        match &object {
            Object::Instance(instance) => instance.borrow().get(&data.name, &object),
            _ => Err(RuntimeError {
                token: data.name.clone(),
                message: "Only instances have properties.".to_string(),
            }),
        }
    }

    fn evaluate_set(&mut self, data: &expr::SetData) -> EvalResult {
        let object = self.evaluate(&data.object)?;

        let Object::Instance(instance) = &object else {
            return Err(RuntimeError { token: data.name.clone(), message: "Only instances have fields.".to_string() });
        };

        let value = self.evaluate(&data.value)?;
        instance.borrow_mut().set(&data.name, value.clone());
        Ok(value)
    }

    fn evaluate_super(&mut self, id: ExprId, data: &expr::SuperData) -> EvalResult {
        let distance = *self.locals.get(&id).expect("resolver always records a depth for 'super'");

        let superclass = Environment::get_at(&self.environment, distance, &data.keyword)?;
        let Object::Class(superclass) = superclass else {
            unreachable!("'super' always resolves to a class value")
        };

        // `this` lives one scope closer in than `super` — the interpreter
        // pushes exactly one extra frame between a class's closure and its
        // methods to bind `super`.
        let this_token = Token::new(TokenKind::This, "this".to_string(), None, data.keyword.line);
        let instance = Environment::get_at(&self.environment, distance - 1, &this_token)?;

        match superclass.borrow().get_method(&data.method.lexeme) {
            Some(method) => Ok(Object::Function(method.bind(instance))),
            None => Err(RuntimeError {
                token: data.method.clone(),
                message: format!("Undefined property '{}'.", data.method.lexeme),
            }),
        }
    }
}

fn superclass_name_token(expr: &Expr) -> Token {
    match &expr.kind {
        ExprKind::Variable(data) => data.name.clone(),
        _ => unreachable!("the parser only ever parses a superclass clause as a bare identifier"),
    }
}
