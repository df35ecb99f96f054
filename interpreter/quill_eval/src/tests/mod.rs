//! Evaluator-level test suites.
//!
//! Programs are assembled with `quill_ir::ProgramBuilder` and run with
//! a buffering output handler; assertions read captured output and the
//! final global environment.

#![expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

mod class_tests;
mod namespace_tests;
mod operator_tests;

use quill_ir::{
    ClassDecl, MethodDecl, Program, ProgramBuilder, PropDecl, Span, Visibility,
};

use crate::output::buffer_output;
use crate::signal::EvalError;
use crate::value::Value;
use crate::{Halt, Interpreter, SharedOutput};

/// Outcome of one test run.
pub(crate) struct Run<'p> {
    pub halt: Halt,
    pub interp: Interpreter<'p>,
    pub output: SharedOutput,
}

impl Run<'_> {
    /// Captured `echo`/`var_dump` output.
    pub fn output(&self) -> String {
        self.output.captured()
    }

    /// Final value of a global variable.
    pub fn global(&self, name: &str) -> Value {
        self.interp
            .global(name)
            .unwrap_or_else(|| panic!("global ${name} was never set"))
    }

    /// Assert the program ran to completion.
    pub fn assert_complete(&self) -> &Self {
        match &self.halt {
            Halt::Complete(_) => self,
            other => panic!("expected completion, got {other:?}"),
        }
    }

    /// Assert the program died with a fatal evaluator error.
    pub fn expect_fatal(&self) -> &EvalError {
        match &self.halt {
            Halt::Fatal(err) => err,
            other => panic!("expected a fatal error, got {other:?}"),
        }
    }
}

/// Run a finished program with buffered output.
pub(crate) fn run(program: &Program) -> Run<'_> {
    let output = buffer_output();
    let mut interp = Interpreter::with_output(program, output.clone());
    let halt = interp.run();
    Run {
        halt,
        interp,
        output,
    }
}

/// An empty class declaration to flesh out per test.
pub(crate) fn class_decl(b: &ProgramBuilder, name: &str) -> ClassDecl {
    ClassDecl {
        name: b.name(name),
        parent: None,
        interfaces: Vec::new(),
        uses: Vec::new(),
        consts: Vec::new(),
        props: Vec::new(),
        methods: Vec::new(),
        is_abstract: false,
        is_final: false,
        span: Span::DUMMY,
    }
}

/// A public instance property with an optional default.
pub(crate) fn prop(b: &ProgramBuilder, name: &str, default: Option<quill_ir::ExprId>) -> PropDecl {
    PropDecl {
        name: b.name(name),
        visibility: Visibility::Public,
        is_static: false,
        default,
    }
}

/// A public instance method.
pub(crate) fn method(func: quill_ir::FuncId) -> MethodDecl {
    MethodDecl {
        func,
        visibility: Visibility::Public,
        is_static: false,
        is_abstract: false,
        is_final: false,
    }
}

/// Shorthand for asserting an int-valued global.
pub(crate) fn assert_int(run: &Run<'_>, name: &str, expected: i64) {
    assert_eq!(run.global(name), Value::int(expected), "${name}");
}
