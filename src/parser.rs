use std::rc::Rc;

use crate::error::{Diagnostics, ParseError, Reportable};
use crate::expr::{
    AssignData, BinaryData, CallData, Expr, ExprId, ExprKind, GetData, LogicalData, SetData,
    SuperData, ThisData, UnaryData, VariableData,
};
use crate::literal::Literal;
use crate::stmt::{
    BlockData, ClassData, ExpressionData, FunctionData, IfData, PrintData, ReturnData, Stmt,
    VarData, WhileData,
};
use crate::token::{Token, TokenKind};

type ParseResult<T> = Result<T, ParseError>;

const MAX_ARGS: usize = 255;

/// Recursive-descent parser, precedence low to high:
///
/// - Program     -> Declaration* EOF ;
/// - Declaration -> ClassDecl | FunDecl | VarDecl | Statement ;
/// - ClassDecl   -> "class" IDENTIFIER ( "<" IDENTIFIER )? "{" Function* "}" ;
/// - FunDecl     -> "fun" Function ;
/// - VarDecl     -> "var" IDENTIFIER ( "=" Expression )? ";" ;
/// - Function    -> IDENTIFIER "(" Parameters? ")" Block ;
/// - Parameters  -> IDENTIFIER ( "," IDENTIFIER )* ;
/// - Statement   -> ExprStmt | ForStmt | IfStmt | PrintStmt | ReturnStmt | WhileStmt | Block ;
/// - ExprStmt    -> Expression ";" ;
/// - ForStmt     -> "for" "(" ( Declaration | ExprStmt | ";" ) Expression? ";" Expression? ")" Statement ;
/// - IfStmt      -> "if" "(" Expression ")" Statement ( "else" Statement )? ;
/// - PrintStmt   -> "print" Expression ";" ;
/// - ReturnStmt  -> "return" Expression? ";" ;
/// - WhileStmt   -> "while" "(" Expression ")" Statement ;
/// - Expression  -> Assignment ;
/// - Assignment  -> ( Call "." )? IDENTIFIER "=" Assignment | LogicOr ;
/// - LogicOr     -> LogicAnd ( "or" LogicAnd )* ;
/// - LogicAnd    -> Equality ( "and" Equality )* ;
/// - Equality    -> Comparison ( ( "!=" | "==" ) Comparison )* ;
/// - Comparison  -> Term ( ( ">" | ">=" | "<" | "<=" ) Term )* ;
/// - Term        -> Factor ( ( "+" | "-" ) Factor )* ;
/// - Factor      -> Unary ( ( "*" | "/" ) Unary )* ;
/// - Unary       -> ( "!" | "-" ) Unary | Call ;
/// - Call        -> Primary ( "(" Arguments? ")" | "." IDENTIFIER )* ;
/// - Arguments   -> Expression ( "," Expression )* ;
/// - Primary     -> NUMBER | STRING | "false" | "true" | "nil" | "this"
///                | "(" Expression ")" | IDENTIFIER | "super" "." IDENTIFIER ;
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_id: ExprId,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser::with_start_id(tokens, 0)
    }

    /// Like [`Parser::new`], but starts handing out expression ids from
    /// `start_id` rather than 0. The REPL driver keeps a running counter
    /// across lines so that ids stay globally unique for the interpreter's
    /// whole lifetime — see [`Interpreter::resolve`](crate::interpreter::Interpreter::resolve).
    pub fn with_start_id(tokens: Vec<Token>, start_id: ExprId) -> Self {
        Parser { tokens, current: 0, next_id: start_id }
    }

    /// The next id this parser would hand out, for the driver to persist.
    pub fn next_id(&self) -> ExprId {
        self.next_id
    }

    fn fresh_id(&mut self) -> ExprId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn expr(&mut self, kind: ExprKind) -> Expr {
        let id = self.fresh_id();
        Expr { id, kind }
    }

    /// Parses every declaration it can, recovering from errors via
    /// `synchronize` so one bad statement doesn't stop the whole program.
    pub fn parse(&mut self, diagnostics: &mut Diagnostics) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration(diagnostics) {
                statements.push(stmt);
            }
        }

        statements
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EOF
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|k| self.check(*k)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<&Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }

        Err(ParseError { token: self.peek().clone(), message: message.to_string() })
    }

    fn declaration(&mut self, diagnostics: &mut Diagnostics) -> Option<Stmt> {
        let result = if self.matches(&[TokenKind::Class]) {
            self.class_declaration(diagnostics)
        } else if self.matches(&[TokenKind::Fun]) {
            self.function("function", diagnostics).map(Stmt::Function)
        } else if self.matches(&[TokenKind::Var]) {
            self.var_declaration()
        } else {
            self.statement(diagnostics)
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                error.report(diagnostics);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect class name.")?.clone();

        let superclass = if self.matches(&[TokenKind::Less]) {
            self.consume(TokenKind::Identifier, "Expect superclass name.")?;
            let name = self.previous().clone();
            Some(self.expr(ExprKind::Variable(VariableData { name })))
        } else {
            None
        };

        self.consume(TokenKind::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method", diagnostics)?);
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class(ClassData { name, superclass, methods }))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?.clone();

        let initializer = if self.matches(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(VarData { name, initializer }))
    }

    fn statement(&mut self, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
        if self.matches(&[TokenKind::For]) {
            return self.for_statement(diagnostics);
        }
        if self.matches(&[TokenKind::If]) {
            return self.if_statement(diagnostics);
        }
        if self.matches(&[TokenKind::Print]) {
            return self.print_statement();
        }
        if self.matches(&[TokenKind::Return]) {
            return self.return_statement();
        }
        if self.matches(&[TokenKind::While]) {
            return self.while_statement(diagnostics);
        }
        if self.matches(&[TokenKind::LeftBrace]) {
            return Ok(Stmt::Block(BlockData { statements: self.block(diagnostics)? }));
        }

        self.expression_statement()
    }

    fn for_statement(&mut self, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(TokenKind::RightParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement(diagnostics)?;

        if let Some(increment) = increment {
            body = Stmt::Block(BlockData {
                statements: vec![body, Stmt::Expression(ExpressionData { expr: increment })],
            });
        }

        let condition = condition.unwrap_or_else(|| self.expr(ExprKind::Literal(Literal::Bool(true))));
        body = Stmt::While(WhileData { condition, body: Box::new(body) });

        if let Some(initializer) = initializer {
            body = Stmt::Block(BlockData { statements: vec![initializer, body] });
        }

        Ok(body)
    }

    fn if_statement(&mut self, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement(diagnostics)?);
        let else_branch = if self.matches(&[TokenKind::Else]) {
            Some(Box::new(self.statement(diagnostics)?))
        } else {
            None
        };

        Ok(Stmt::If(IfData { condition, then_branch, else_branch }))
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(PrintData { expr }))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let value = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    fn while_statement(&mut self, diagnostics: &mut Diagnostics) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement(diagnostics)?);

        Ok(Stmt::While(WhileData { condition, body }))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    fn function(&mut self, kind: &str, diagnostics: &mut Diagnostics) -> ParseResult<Rc<FunctionData>> {
        let name = self.consume(TokenKind::Identifier, &format!("Expect {kind} name."))?.clone();

        self.consume(TokenKind::LeftParen, &format!("Expect '(' after {kind} name."))?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    return Err(ParseError {
                        token: self.peek().clone(),
                        message: format!("Can't have more than {MAX_ARGS} parameters."),
                    });
                }

                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?.clone());

                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }

        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        self.consume(TokenKind::LeftBrace, &format!("Expect '{{' before {kind} body."))?;

        let body = self.block(diagnostics)?;

        Ok(Rc::new(FunctionData { name, params, body }))
    }

    fn block(&mut self, diagnostics: &mut Diagnostics) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration(diagnostics) {
                statements.push(stmt);
            }
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr.kind {
                ExprKind::Variable(data) => {
                    Ok(self.expr(ExprKind::Assign(AssignData { name: data.name, value: Box::new(value) })))
                }
                ExprKind::Get(data) => Ok(self.expr(ExprKind::Set(SetData {
                    object: data.object,
                    name: data.name,
                    value: Box::new(value),
                }))),
                _ => Err(ParseError { token: equals, message: "Invalid assignment target.".to_string() }),
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while self.matches(&[TokenKind::Or]) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = self.expr(ExprKind::Logical(LogicalData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            }));
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while self.matches(&[TokenKind::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = self.expr(ExprKind::Logical(LogicalData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            }));
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while self.matches(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = self.expr(ExprKind::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            }));
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while self.matches(&[
            TokenKind::Greater, TokenKind::GreaterEqual, TokenKind::Less, TokenKind::LessEqual,
        ]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = self.expr(ExprKind::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            }));
        }

        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while self.matches(&[TokenKind::Minus, TokenKind::Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = self.expr(ExprKind::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            }));
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while self.matches(&[TokenKind::Slash, TokenKind::Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = self.expr(ExprKind::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            }));
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(self.expr(ExprKind::Unary(UnaryData { operator, right: Box::new(right) })));
        }

        self.call()
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    return Err(ParseError {
                        token: self.peek().clone(),
                        message: format!("Can't have more than {MAX_ARGS} arguments."),
                    });
                }

                arguments.push(self.expression()?);

                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }

        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?.clone();

        Ok(self.expr(ExprKind::Call(CallData { callee: Box::new(callee), paren, arguments })))
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.matches(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[TokenKind::Dot]) {
                let name = self.consume(TokenKind::Identifier, "Expect property name after '.'.")?.clone();
                expr = self.expr(ExprKind::Get(GetData { object: Box::new(expr), name }));
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::False]) {
            return Ok(self.expr(ExprKind::Literal(Literal::Bool(false))));
        }
        if self.matches(&[TokenKind::True]) {
            return Ok(self.expr(ExprKind::Literal(Literal::Bool(true))));
        }
        if self.matches(&[TokenKind::Nil]) {
            return Ok(self.expr(ExprKind::Literal(Literal::Nil)));
        }
        if self.matches(&[TokenKind::Number, TokenKind::String]) {
            let literal = self.previous().literal.clone().expect("number or string token to carry a literal");
            return Ok(self.expr(ExprKind::Literal(literal)));
        }
        if self.matches(&[TokenKind::Super]) {
            let keyword = self.previous().clone();
            self.consume(TokenKind::Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(TokenKind::Identifier, "Expect superclass method name.")?.clone();
            return Ok(self.expr(ExprKind::Super(SuperData { keyword, method })));
        }
        if self.matches(&[TokenKind::This]) {
            let keyword = self.previous().clone();
            return Ok(self.expr(ExprKind::This(ThisData { keyword })));
        }
        if self.matches(&[TokenKind::Identifier]) {
            let name = self.previous().clone();
            return Ok(self.expr(ExprKind::Variable(VariableData { name })));
        }
        if self.matches(&[TokenKind::LeftParen]) {
            let inner = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(self.expr(ExprKind::Grouping(Box::new(inner))));
        }

        Err(ParseError { token: self.peek().clone(), message: "Expect expression.".to_string() })
    }

    /// Advances past the offending token(s) until we're likely at the start
    /// of the next statement, so one parse error doesn't cascade into
    /// spurious follow-on errors.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Class | TokenKind::Fun | TokenKind::Var | TokenKind::For
                | TokenKind::If | TokenKind::While | TokenKind::Print | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> (Vec<Stmt>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);
        let statements = Parser::new(tokens).parse(&mut diagnostics);
        (statements, diagnostics)
    }

    #[test]
    fn parses_expression_statement() {
        let (statements, diagnostics) = parse("1 + 2;");
        assert!(!diagnostics.had_error());
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Stmt::Expression(_)));
    }

    #[test]
    fn left_associative_binary_chain() {
        let (statements, _) = parse("1 - 2 - 3;");
        let Stmt::Expression(ExpressionData { expr }) = &statements[0] else { panic!() };
        let ExprKind::Binary(BinaryData { left, .. }) = &expr.kind else { panic!() };
        assert!(matches!(left.kind, ExprKind::Binary(_)));
    }

    #[test]
    fn assignment_to_non_lvalue_is_an_error() {
        let (_, diagnostics) = parse("1 = 2;");
        assert!(diagnostics.had_error());
    }

    #[test]
    fn distinct_variable_occurrences_get_distinct_ids() {
        let (statements, _) = parse("a; a;");
        let mut ids = Vec::new();
        for stmt in &statements {
            if let Stmt::Expression(ExpressionData { expr }) = stmt {
                ids.push(expr.id);
            }
        }
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn for_desugars_into_while_block() {
        let (statements, diagnostics) = parse("for (var i = 0; i < 3; i = i + 1) print i;");
        assert!(!diagnostics.had_error());
        let Stmt::Block(BlockData { statements }) = &statements[0] else { panic!() };
        assert!(matches!(statements[0], Stmt::Var(_)));
        assert!(matches!(statements[1], Stmt::While(_)));
    }

    #[test]
    fn for_without_clauses_loops_on_true() {
        let (statements, _) = parse("for (;;) print 1;");
        let Stmt::While(WhileData { condition, .. }) = &statements[0] else { panic!() };
        assert!(matches!(condition.kind, ExprKind::Literal(Literal::Bool(true))));
    }

    #[test]
    fn class_with_superclass_clause() {
        let (statements, diagnostics) = parse("class B < A { method() {} }");
        assert!(!diagnostics.had_error());
        let Stmt::Class(ClassData { superclass, methods, .. }) = &statements[0] else { panic!() };
        assert!(superclass.is_some());
        assert_eq!(methods.len(), 1);
    }

    #[test]
    fn synchronize_recovers_after_bad_statement() {
        let (statements, diagnostics) = parse("var = 1; var b = 2;");
        assert!(diagnostics.had_error());
        assert!(statements.iter().any(|s| matches!(s, Stmt::Var(_))));
    }

    #[test]
    fn error_inside_a_block_is_reported_on_the_caller_diagnostics() {
        let (_, diagnostics) = parse("{ 1 = 2; }");
        assert!(diagnostics.had_error());
    }

    #[test]
    fn error_inside_a_function_body_is_reported_on_the_caller_diagnostics() {
        let (_, diagnostics) = parse("fun f() { 1 = 2; }");
        assert!(diagnostics.had_error());
    }
}
