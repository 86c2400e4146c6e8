#![allow(clippy::needless_return)]

//! Loxwalk is a tree-walking interpreter for Lox, the small dynamically
//! typed scripting language from Crafting Interpreters, written in Rust.
//!
//! ## Pipeline
//!
//! Source text passes through four stages, each gating the next on
//! error-free completion:
//!
//! 1. [`scanner`] turns source text into a flat list of [`token::Token`]s,
//!    reporting lexical errors ([`error::ScanError`]) as it goes.
//! 2. [`parser`] turns tokens into a list of [`stmt::Stmt`] via recursive
//!    descent, reporting syntax errors ([`error::ParseError`]).
//! 3. [`resolver`] statically resolves every variable reference to a
//!    lexical scope depth, reporting errors ([`error::ResolveError`]) like
//!    reading a variable in its own initializer or returning from top-level
//!    code.
//! 4. [`interpreter`] walks the resolved tree and evaluates it, reporting
//!    [`error::RuntimeError`] for things that can only fail at runtime
//!    (calling a non-callable, adding a string to a number, ...).
//!
//! [`ast::Printer`] is a side pipeline used only for debugging: it renders
//! a parsed tree back out as a parenthesized Lisp-like form.

use std::io::{self, Write};
use std::path::PathBuf;
use std::{fs, process};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use error::Diagnostics;
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// Usage/compile-time error: bad CLI invocation, or a scan/parse/resolve
/// error was reported.
pub const EXIT_USAGE_OR_COMPILE_ERROR: i32 = 64;
/// A runtime error was reported while interpreting an otherwise valid program.
pub const EXIT_RUNTIME_ERROR: i32 = 70;
/// The script file couldn't be read, or the persistent history file
/// couldn't be loaded/saved. Distinct from the two codes above, matching
/// the BSD `sysexits.h` `EX_IOERR` convention.
pub const EXIT_IO_ERROR: i32 = 74;

/// Owns the interpreter and the running `ExprId` counter across however
/// many chunks of source get run through it (one for a script file, one
/// per line in the REPL).
pub struct Lox {
    interpreter: Interpreter,
    next_expr_id: expr::ExprId,
}

impl Lox {
    pub fn new(output: Box<dyn Write>) -> Self {
        Lox { interpreter: Interpreter::new(output), next_expr_id: 0 }
    }

    /// Scans, parses, resolves, and interprets `source` as one unit.
    /// `ExprId`s are threaded through from the previous call so that the
    /// interpreter's resolved-locals table, which only ever grows, never
    /// aliases an id from an earlier call.
    pub fn run(&mut self, source: &str, diagnostics: &mut Diagnostics) {
        let tokens = Scanner::new(source).scan_tokens(diagnostics);
        if diagnostics.had_error() {
            return;
        }

        let mut parser = Parser::with_start_id(tokens, self.next_expr_id);
        let statements = parser.parse(diagnostics);
        self.next_expr_id = parser.next_id();
        if diagnostics.had_error() {
            return;
        }

        let locals = Resolver::new(diagnostics).resolve(&statements);
        if diagnostics.had_error() {
            return;
        }
        self.interpreter.resolve(locals);

        if let Err(error) = self.interpreter.interpret(&statements) {
            error::Reportable::report(&error, diagnostics);
        }
    }

    /// Runs a script file to completion and exits the process with the
    /// exit code matching what happened (0, 64, 70, or 74).
    pub fn run_file(path: &str) -> ! {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                eprintln!("Failed to read '{path}': {error}");
                process::exit(EXIT_IO_ERROR);
            }
        };

        let mut lox = Lox::new(Box::new(io::stdout()));
        let mut diagnostics = Diagnostics::new();
        lox.run(&source, &mut diagnostics);

        if diagnostics.had_error() && !diagnostics.had_runtime_error() {
            process::exit(EXIT_USAGE_OR_COMPILE_ERROR);
        }
        if diagnostics.had_runtime_error() {
            process::exit(EXIT_RUNTIME_ERROR);
        }
        process::exit(0);
    }

    /// Runs an interactive prompt with line editing and a persistent
    /// history file at `~/.loxwalk_history`. Each line is run independently,
    /// but `ExprId`s and the resolved-locals table (and so closures/classes
    /// defined on earlier lines) persist across the whole session.
    pub fn run_prompt() -> ! {
        let mut editor = DefaultEditor::new().unwrap_or_else(|error| {
            eprintln!("Failed to start the line editor: {error}");
            process::exit(EXIT_IO_ERROR);
        });

        let history_path = history_path();
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        let mut lox = Lox::new(Box::new(io::stdout()));

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = editor.add_history_entry(line.as_str());
                    let mut diagnostics = Diagnostics::new();
                    lox.run(&line, &mut diagnostics);
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(error) => {
                    eprintln!("Readline error: {error}");
                    break;
                }
            }
        }

        if let Some(path) = &history_path {
            let _ = editor.save_history(path);
        }

        process::exit(0);
    }
}

fn history_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".loxwalk_history"))
}
