use std::collections::HashMap;

use crate::error::{Diagnostics, Reportable, ResolveError};
use crate::expr::{Expr, ExprId, ExprKind};
use crate::stmt::{ClassData, FunctionData, Stmt};
use crate::token::Token;

#[derive(Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Static analysis pass: walks the AST exactly like the interpreter but
/// with no side effects and no control flow — every branch is visited
/// exactly once — and produces a side table mapping each variable-reference
/// expression to how many enclosing lexical scopes to climb to find its
/// binding. Absence from the table means "global".
pub struct Resolver<'a> {
    diagnostics: &'a mut Diagnostics,
    scopes: Vec<HashMap<String, bool>>,
    locals: HashMap<ExprId, usize>,
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'a> Resolver<'a> {
    pub fn new(diagnostics: &'a mut Diagnostics) -> Self {
        Resolver {
            diagnostics,
            scopes: Vec::new(),
            locals: HashMap::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    pub fn resolve(mut self, statements: &[Stmt]) -> HashMap<ExprId, usize> {
        for statement in statements {
            self.resolve_stmt(statement);
        }
        self.locals
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(data) => self.resolve_expr(&data.expr),
            Stmt::Print(data) => self.resolve_expr(&data.expr),
            Stmt::Var(data) => {
                self.declare(&data.name);
                if let Some(initializer) = &data.initializer {
                    self.resolve_expr(initializer);
                }
                self.define(&data.name);
            }
            Stmt::Block(data) => {
                self.begin_scope();
                for statement in &data.statements {
                    self.resolve_stmt(statement);
                }
                self.end_scope();
            }
            Stmt::If(data) => {
                self.resolve_expr(&data.condition);
                self.resolve_stmt(&data.then_branch);
                if let Some(else_branch) = &data.else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While(data) => {
                self.resolve_expr(&data.condition);
                self.resolve_stmt(&data.body);
            }
            Stmt::Function(declaration) => {
                self.declare(&declaration.name);
                self.define(&declaration.name);
                self.resolve_function(declaration, FunctionType::Function);
            }
            Stmt::Return(data) => {
                if self.current_function == FunctionType::None {
                    ResolveError {
                        token: data.keyword.clone(),
                        message: "Can't return from top-level code.".to_string(),
                    }
                    .report(self.diagnostics);
                }

                if let Some(value) = &data.value {
                    if self.current_function == FunctionType::Initializer {
                        ResolveError {
                            token: data.keyword.clone(),
                            message: "Can't return a value from an initializer.".to_string(),
                        }
                        .report(self.diagnostics);
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Class(data) => self.resolve_class(data),
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Literal(_) => {}
            ExprKind::Grouping(inner) => self.resolve_expr(inner),
            ExprKind::Unary(data) => self.resolve_expr(&data.right),
            ExprKind::Binary(data) => {
                self.resolve_expr(&data.left);
                self.resolve_expr(&data.right);
            }
            ExprKind::Logical(data) => {
                self.resolve_expr(&data.left);
                self.resolve_expr(&data.right);
            }
            ExprKind::Variable(data) => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&data.name.lexeme) == Some(&false) {
                        ResolveError {
                            token: data.name.clone(),
                            message: "Can't read local variable in its own initializer.".to_string(),
                        }
                        .report(self.diagnostics);
                    }
                }
                self.resolve_local(expr.id, &data.name);
            }
            ExprKind::Assign(data) => {
                self.resolve_expr(&data.value);
                self.resolve_local(expr.id, &data.name);
            }
            ExprKind::Call(data) => {
                self.resolve_expr(&data.callee);
                for argument in &data.arguments {
                    self.resolve_expr(argument);
                }
            }
            ExprKind::Get(data) => self.resolve_expr(&data.object),
            ExprKind::Set(data) => {
                self.resolve_expr(&data.value);
                self.resolve_expr(&data.object);
            }
            ExprKind::This(data) => {
                if self.current_class == ClassType::None {
                    ResolveError {
                        token: data.keyword.clone(),
                        message: "Can't use 'this' outside of a class.".to_string(),
                    }
                    .report(self.diagnostics);
                    return;
                }
                self.resolve_local(expr.id, &data.keyword);
            }
            ExprKind::Super(data) => {
                match self.current_class {
                    ClassType::Subclass => {}
                    ClassType::None => ResolveError {
                        token: data.keyword.clone(),
                        message: "Can't use 'super' outside of a class.".to_string(),
                    }
                    .report(self.diagnostics),
                    ClassType::Class => ResolveError {
                        token: data.keyword.clone(),
                        message: "Can't use 'super' in a class with no superclass.".to_string(),
                    }
                    .report(self.diagnostics),
                }
                self.resolve_local(expr.id, &data.keyword);
            }
        }
    }

    fn resolve_function(&mut self, declaration: &FunctionData, kind: FunctionType) {
        let enclosing_function = std::mem::replace(&mut self.current_function, kind);

        self.begin_scope();
        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }
        for statement in &declaration.body {
            self.resolve_stmt(statement);
        }
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn resolve_class(&mut self, data: &ClassData) {
        let enclosing_class = std::mem::replace(&mut self.current_class, ClassType::Class);

        self.declare(&data.name);
        self.define(&data.name);

        if let Some(superclass) = &data.superclass {
            if let ExprKind::Variable(variable) = &superclass.kind {
                if variable.name.lexeme == data.name.lexeme {
                    ResolveError {
                        token: variable.name.clone(),
                        message: "A class can't inherit from itself.".to_string(),
                    }
                    .report(self.diagnostics);
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            self.scopes.last_mut().expect("scope just pushed").insert("super".to_string(), true);
        }

        self.begin_scope();
        self.scopes.last_mut().expect("scope just pushed").insert("this".to_string(), true);

        for method in &data.methods {
            let kind = if method.name.lexeme == "init" { FunctionType::Initializer } else { FunctionType::Method };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if data.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Inserts `{declared}` (not yet `{defined}`), reporting an error if the
    /// name already exists in this exact scope. Global scope is never on
    /// the stack, so redeclaration there is always allowed.
    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };

        if scope.contains_key(&name.lexeme) {
            ResolveError {
                token: name.clone(),
                message: format!("Already a variable with this name '{}' in this scope.", name.lexeme),
            }
            .report(self.diagnostics);
        }

        scope.insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        scope.insert(name.lexeme.clone(), true);
    }

    /// Scans frames innermost-out; the first frame containing the name
    /// fixes its depth. No match leaves the node unkeyed (treated as global).
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.locals.insert(id, depth);
                return;
            }
        }
    }
}
