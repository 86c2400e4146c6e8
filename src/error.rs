use crate::token::{Token, TokenKind};

/// Accumulates whether a scan/parse/resolve/runtime error occurred during a run.
///
/// Earlier drafts of this interpreter kept this state in process-global
/// `static mut` flags. Owning it on the driver instead means a REPL can reset
/// between lines without `unsafe`, and running the resolver twice on the same
/// program is actually pure (no hidden global to leak between runs).
#[derive(Debug, Default)]
pub struct Diagnostics {
    had_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any scan, parse, resolve, or runtime error was reported.
    pub fn had_error(&self) -> bool {
        self.had_error || self.had_runtime_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
    }

    fn report(&mut self, line: usize, location: &str, message: &str) {
        eprintln!("[line {line}] Error{location}: {message}");
        self.had_error = true;
    }

    fn report_runtime(&mut self, line: usize, location: &str, message: &str) {
        eprintln!("[line {line}] Error{location}: {message}");
        self.had_runtime_error = true;
    }
}

/// Every reportable error kind knows how to render itself and mark the
/// appropriate flag on [`Diagnostics`].
pub trait Reportable {
    fn report(&self, diagnostics: &mut Diagnostics);
}

/// A scanning error: unterminated string, unexpected character, ...
#[derive(Debug)]
pub struct ScanError {
    pub line: usize,
    pub message: String,
}

impl Reportable for ScanError {
    fn report(&self, diagnostics: &mut Diagnostics) {
        diagnostics.report(self.line, "", &self.message);
    }
}

/// A parse error, reported at the token that triggered it.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Reportable for ParseError {
    fn report(&self, diagnostics: &mut Diagnostics) {
        let location = if self.token.kind == TokenKind::EOF {
            " at end".to_string()
        } else {
            format!(" at '{}'", self.token.lexeme)
        };
        diagnostics.report(self.token.line, &location, &self.message);
    }
}

/// A static-analysis error discovered by the resolver.
#[derive(Debug)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl Reportable for ResolveError {
    fn report(&self, diagnostics: &mut Diagnostics) {
        diagnostics.report(self.token.line, &format!(" at '{}'", self.token.lexeme), &self.message);
    }
}

/// A runtime error raised while evaluating the program; carries the culprit
/// token so the diagnostic can point at a line.
#[derive(Debug)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Reportable for RuntimeError {
    fn report(&self, diagnostics: &mut Diagnostics) {
        diagnostics.report_runtime(self.token.line, &format!(" at '{}'", self.token.lexeme), &self.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_diagnostics_has_no_errors() {
        let diagnostics = Diagnostics::new();
        assert!(!diagnostics.had_error());
        assert!(!diagnostics.had_runtime_error());
    }

    #[test]
    fn runtime_error_sets_both_flags() {
        let mut diagnostics = Diagnostics::new();
        let token = Token::new(TokenKind::Plus, "+".to_string(), None, 1);
        RuntimeError { token, message: "boom".to_string() }.report(&mut diagnostics);

        assert!(diagnostics.had_error());
        assert!(diagnostics.had_runtime_error());
    }

    #[test]
    fn reset_clears_flags() {
        let mut diagnostics = Diagnostics::new();
        let token = Token::new(TokenKind::Plus, "+".to_string(), None, 1);
        ParseError { token, message: "bad".to_string() }.report(&mut diagnostics);
        assert!(diagnostics.had_error());

        diagnostics.reset();
        assert!(!diagnostics.had_error());
    }
}
