use crate::expr::{Expr, ExprKind};
use crate::stmt::Stmt;

/// Renders statements and expressions as a parenthesized Lisp-like form.
///
/// Used only for debugging/testing: printing is a pure function of the
/// tree, so printing the same tree twice always yields the same string.
pub struct Printer;

impl Printer {
    pub fn print_statements(statements: &[Stmt]) -> String {
        statements.iter().map(Printer::print_stmt).collect::<Vec<_>>().join("\n")
    }

    pub fn print_stmt(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(data) => Printer::parenthesize("expr", &[&data.expr]),
            Stmt::Print(data) => Printer::parenthesize("print", &[&data.expr]),
            Stmt::Var(data) => match &data.initializer {
                Some(initializer) => format!("(var {} {})", data.name.lexeme, Printer::print_expr(initializer)),
                None => format!("(var {})", data.name.lexeme),
            },
            Stmt::Block(data) => {
                let body = data.statements.iter().map(Printer::print_stmt).collect::<Vec<_>>().join(" ");
                format!("(block {body})")
            }
            Stmt::If(data) => {
                let condition = Printer::print_expr(&data.condition);
                let then_branch = Printer::print_stmt(&data.then_branch);
                match &data.else_branch {
                    Some(else_branch) => format!("(if {condition} {then_branch} {})", Printer::print_stmt(else_branch)),
                    None => format!("(if {condition} {then_branch})"),
                }
            }
            Stmt::While(data) => {
                format!("(while {} {})", Printer::print_expr(&data.condition), Printer::print_stmt(&data.body))
            }
            Stmt::Function(declaration) => {
                let params = declaration.params.iter().map(|p| p.lexeme.as_str()).collect::<Vec<_>>().join(" ");
                let body = declaration.body.iter().map(Printer::print_stmt).collect::<Vec<_>>().join(" ");
                format!("(fun {} ({params}) {body})", declaration.name.lexeme)
            }
            Stmt::Return(data) => match &data.value {
                Some(value) => format!("(return {})", Printer::print_expr(value)),
                None => "(return)".to_string(),
            },
            Stmt::Class(data) => {
                let superclass = data.superclass.as_ref().map(Printer::print_expr).unwrap_or_default();
                let methods = data
                    .methods
                    .iter()
                    .map(|method| {
                        let params = method.params.iter().map(|p| p.lexeme.as_str()).collect::<Vec<_>>().join(" ");
                        let body = method.body.iter().map(Printer::print_stmt).collect::<Vec<_>>().join(" ");
                        format!("(fun {} ({params}) {body})", method.name.lexeme)
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                if superclass.is_empty() {
                    format!("(class {} {methods})", data.name.lexeme)
                } else {
                    format!("(class {} < {superclass} {methods})", data.name.lexeme)
                }
            }
        }
    }

    pub fn print_expr(expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Literal(literal) => literal.to_string(),
            ExprKind::Grouping(inner) => Printer::parenthesize("group", &[inner]),
            ExprKind::Unary(data) => Printer::parenthesize(&data.operator.lexeme, &[&data.right]),
            ExprKind::Binary(data) => Printer::parenthesize(&data.operator.lexeme, &[&data.left, &data.right]),
            ExprKind::Logical(data) => Printer::parenthesize(&data.operator.lexeme, &[&data.left, &data.right]),
            ExprKind::Variable(data) => data.name.lexeme.clone(),
            ExprKind::Assign(data) => format!("(= {} {})", data.name.lexeme, Printer::print_expr(&data.value)),
            ExprKind::Call(data) => {
                let callee = Printer::print_expr(&data.callee);
                let arguments = data.arguments.iter().map(Printer::print_expr).collect::<Vec<_>>().join(" ");
                if arguments.is_empty() {
                    format!("(call {callee})")
                } else {
                    format!("(call {callee} {arguments})")
                }
            }
            ExprKind::Get(data) => format!("(. {} {})", Printer::print_expr(&data.object), data.name.lexeme),
            ExprKind::Set(data) => {
                format!("(set {} {} {})", Printer::print_expr(&data.object), data.name.lexeme, Printer::print_expr(&data.value))
            }
            ExprKind::This(_) => "this".to_string(),
            ExprKind::Super(data) => format!("(super {})", data.method.lexeme),
        }
    }

    fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
        let body = exprs.iter().map(|e| Printer::print_expr(e)).collect::<Vec<_>>().join(" ");
        format!("({name} {body})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostics;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> Vec<Stmt> {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);
        Parser::new(tokens).parse(&mut diagnostics)
    }

    #[test]
    fn prints_binary_expression_in_prefix_form() {
        let statements = parse("1 + 2 * 3;");
        assert_eq!(Printer::print_statements(&statements), "(expr (+ 1 (* 2 3)))");
    }

    #[test]
    fn prints_grouping() {
        let statements = parse("(1 + 2) * 3;");
        assert_eq!(Printer::print_statements(&statements), "(expr (* (group (+ 1 2)) 3))");
    }

    #[test]
    fn printing_is_idempotent() {
        let statements = parse("var a = 1; if (a) print a; else print \"no\";");
        let first = Printer::print_statements(&statements);
        let second = Printer::print_statements(&statements);
        assert_eq!(first, second);
    }

    #[test]
    fn prints_call_with_no_arguments() {
        let statements = parse("clock();");
        assert_eq!(Printer::print_statements(&statements), "(expr (call clock))");
    }
}
