use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};

use crate::error::{Diagnostics, Reportable, ScanError};
use crate::literal::Literal;
use crate::token::{Token, TokenKind};

/// Converts a source string into a flat token stream, always terminated by `EOF`.
///
/// Whitespace and `//` comments are skipped; unterminated strings and unknown
/// characters are reported through [`Diagnostics`] but do not stop scanning —
/// the scanner always produces as many tokens as it can so a user sees every
/// syntax problem in one pass.
pub struct Scanner<'a> {
    source: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source: source.chars().peekmore(),
            tokens: Vec::new(),
            line: 1,
        }
    }

    /// Scans the whole source and returns its token stream, EOF-terminated.
    pub fn scan_tokens(mut self, diagnostics: &mut Diagnostics) -> Vec<Token> {
        while !self.is_at_end() {
            self.scan_token(diagnostics);
        }

        self.tokens.push(Token::new(TokenKind::EOF, String::new(), None, self.line));
        self.tokens
    }

    fn is_at_end(&mut self) -> bool {
        self.source.peek().is_none()
    }

    fn advance(&mut self) -> char {
        self.source.next().expect("advance called past end of source")
    }

    fn peek(&mut self) -> char {
        self.source.peek().copied().unwrap_or('\0')
    }

    fn peek_next(&mut self) -> char {
        self.source.peek_next().copied().unwrap_or('\0')
    }

    fn advance_if(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn add_token(&mut self, kind: TokenKind, lexeme: String, literal: Option<Literal>) {
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn add_single_char_token(&mut self, kind: TokenKind) {
        let c = self.advance();
        self.add_token(kind, c.to_string(), None);
    }

    fn string(&mut self, diagnostics: &mut Diagnostics) {
        let start_line = self.line;
        let mut value = String::new();

        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            value.push(self.advance());
        }

        if self.is_at_end() {
            ScanError { line: start_line, message: "Unterminated string".to_string() }.report(diagnostics);
            return;
        }

        self.advance(); // closing quote

        self.add_token(TokenKind::String, value.clone(), Some(Literal::String(value)));
    }

    fn number(&mut self) {
        let mut lexeme = String::new();

        while self.peek().is_ascii_digit() {
            lexeme.push(self.advance());
        }

        // A trailing dot with no digits after it is not consumed here — it is
        // left for the parser/scanner's next pass to tokenize as its own `.`.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            lexeme.push(self.advance());
            while self.peek().is_ascii_digit() {
                lexeme.push(self.advance());
            }
        }

        let value: f64 = lexeme.parse().expect("scanned digits to form a valid number");
        self.add_token(TokenKind::Number, lexeme, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        let mut lexeme = String::new();

        while self.peek().is_alphanumeric() || self.peek() == '_' {
            lexeme.push(self.advance());
        }

        let kind = match lexeme.as_str() {
            "and" => TokenKind::And,
            "class" => TokenKind::Class,
            "else" => TokenKind::Else,
            "false" => TokenKind::False,
            "for" => TokenKind::For,
            "fun" => TokenKind::Fun,
            "if" => TokenKind::If,
            "nil" => TokenKind::Nil,
            "or" => TokenKind::Or,
            "print" => TokenKind::Print,
            "return" => TokenKind::Return,
            "super" => TokenKind::Super,
            "this" => TokenKind::This,
            "true" => TokenKind::True,
            "var" => TokenKind::Var,
            "while" => TokenKind::While,
            _ => TokenKind::Identifier,
        };

        self.add_token(kind, lexeme, None);
    }

    fn scan_token(&mut self, diagnostics: &mut Diagnostics) {
        let c = self.peek();
        match c {
            '(' => self.add_single_char_token(TokenKind::LeftParen),
            ')' => self.add_single_char_token(TokenKind::RightParen),
            '{' => self.add_single_char_token(TokenKind::LeftBrace),
            '}' => self.add_single_char_token(TokenKind::RightBrace),
            ',' => self.add_single_char_token(TokenKind::Comma),
            '.' => self.add_single_char_token(TokenKind::Dot),
            '-' => self.add_single_char_token(TokenKind::Minus),
            '+' => self.add_single_char_token(TokenKind::Plus),
            ';' => self.add_single_char_token(TokenKind::Semicolon),
            '*' => self.add_single_char_token(TokenKind::Star),

            '!' => {
                self.advance();
                if self.advance_if('=') {
                    self.add_token(TokenKind::BangEqual, "!=".to_string(), None);
                } else {
                    self.add_token(TokenKind::Bang, "!".to_string(), None);
                }
            }
            '=' => {
                self.advance();
                if self.advance_if('=') {
                    self.add_token(TokenKind::EqualEqual, "==".to_string(), None);
                } else {
                    self.add_token(TokenKind::Equal, "=".to_string(), None);
                }
            }
            '<' => {
                self.advance();
                if self.advance_if('=') {
                    self.add_token(TokenKind::LessEqual, "<=".to_string(), None);
                } else {
                    self.add_token(TokenKind::Less, "<".to_string(), None);
                }
            }
            '>' => {
                self.advance();
                if self.advance_if('=') {
                    self.add_token(TokenKind::GreaterEqual, ">=".to_string(), None);
                } else {
                    self.add_token(TokenKind::Greater, ">".to_string(), None);
                }
            }
            '/' => {
                self.advance();
                if self.advance_if('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenKind::Slash, "/".to_string(), None);
                }
            }

            ' ' | '\r' | '\t' => {
                self.advance();
            }
            '\n' => {
                self.advance();
                self.line += 1;
            }

            '"' => self.string(diagnostics),

            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => {
                self.advance();
                ScanError {
                    line: self.line,
                    message: format!("Unexpected character '{c}'"),
                }.report(diagnostics);
            }
        }
    }
}
