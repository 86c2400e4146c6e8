use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use loxwalk::error::Diagnostics;
use loxwalk::Lox;

/// A `Write` sink that can be cloned and inspected after the writer that
/// owns the original handle has been dropped, since `Lox` takes ownership
/// of a boxed `Write`.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        SharedBuffer::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("program output to be valid UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

/// Runs `source` through the full scan/parse/resolve/interpret pipeline,
/// returning everything it printed plus whatever diagnostics fired.
pub fn run(source: &str) -> (String, Diagnostics) {
    let output = SharedBuffer::new();
    let mut lox = Lox::new(Box::new(output.clone()));
    let mut diagnostics = Diagnostics::new();
    lox.run(source, &mut diagnostics);
    (output.contents(), diagnostics)
}
