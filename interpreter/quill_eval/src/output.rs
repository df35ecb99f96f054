//! Output handling for `echo` and the dump builtins.
//!
//! The evaluator holds a single `write(&str)` capability behind a shared
//! handle; where the bytes go is the embedder's choice. Enum dispatch
//! keeps the hot path free of vtable indirection.

use std::rc::Rc;

use parking_lot::Mutex;

/// Where evaluator output goes.
pub enum OutputHandler {
    /// Write straight to stdout (the default for a CLI driver).
    Stdout,
    /// Capture into a buffer (tests, embedding).
    Buffer(Mutex<String>),
    /// Discard everything.
    Silent,
}

impl OutputHandler {
    pub fn write(&self, s: &str) {
        match self {
            OutputHandler::Stdout => print!("{s}"),
            OutputHandler::Buffer(buf) => buf.lock().push_str(s),
            OutputHandler::Silent => {}
        }
    }

    /// Captured output so far; empty for non-capturing handlers.
    pub fn captured(&self) -> String {
        match self {
            OutputHandler::Buffer(buf) => buf.lock().clone(),
            OutputHandler::Stdout | OutputHandler::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let OutputHandler::Buffer(buf) = self {
            buf.lock().clear();
        }
    }
}

/// Shared handle the interpreter and embedder both hold.
pub type SharedOutput = Rc<OutputHandler>;

pub fn stdout_output() -> SharedOutput {
    Rc::new(OutputHandler::Stdout)
}

pub fn buffer_output() -> SharedOutput {
    Rc::new(OutputHandler::Buffer(Mutex::new(String::new())))
}

pub fn silent_output() -> SharedOutput {
    Rc::new(OutputHandler::Silent)
}
