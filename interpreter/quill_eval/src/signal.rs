//! Control signals and the evaluator error channel.
//!
//! Every evaluation function returns [`ExecResult`]: the `Ok` arm is an
//! ordinary value, the `Err` arm is a [`Signal`]. Non-local control flow
//! (`return`, `break`, `continue`, `throw`, `exit`) and terminal evaluator
//! errors all travel through the same channel, so `?` gives unchanged
//! propagation and each construct consumes exactly the signal kinds it
//! handles. `match` exhaustiveness makes a forgotten re-raise a compile
//! error instead of a silently swallowed signal.

use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Result of evaluating one statement or expression.
pub type ExecResult = Result<Value, Signal>;

/// Non-local control flow and evaluator failure.
///
/// Consumers:
/// - loops consume `Break`/`Continue` at level 1 and re-raise deeper levels
///   decremented by one,
/// - `switch` consumes `Break(1)`,
/// - call frames consume `Return`,
/// - `try`/`catch` consumes `Thrown`,
/// - the driver consumes `Exit` and everything that reaches the top level.
#[derive(Clone, Debug)]
pub enum Signal {
    /// `return expr;` unwinding to the nearest call frame.
    Return(Value),
    /// `break n;` — the level count is decremented by each loop it crosses.
    Break(u32),
    /// `continue n;` — symmetric with `Break`.
    Continue(u32),
    /// `throw expr;` — the only signal `try`/`catch` consumes. Carries the
    /// exception object.
    Thrown(Value),
    /// `exit`/`die` — unwinds through every block, loop, and `try`; only
    /// the driver stops it (`finally` blocks still run on the way out).
    Exit {
        status: i64,
        message: Option<Rc<str>>,
    },
    /// Terminal evaluator failure. Never convertible into a catchable
    /// exception.
    Error(EvalError),
}

impl From<EvalError> for Signal {
    fn from(err: EvalError) -> Self {
        Signal::Error(err)
    }
}

/// What went wrong inside the evaluator itself.
///
/// Distinct from language exceptions (`Signal::Thrown`): these are failures
/// of the program's relationship to the evaluator — undefined symbols,
/// type-check violations, arithmetic faults — and bubble to the driver
/// uncatchably.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    UndefinedVariable,
    UndefinedFunction,
    UndefinedClass,
    UndefinedMethod,
    UndefinedProperty,
    UndefinedConstant,
    NotCallable,
    ArgumentBinding,
    TypeMismatch,
    VisibilityViolation,
    DivisionByZero,
    InvalidOperand,
    InvalidDeclaration,
    NotAnObject,
    NotIterable,
    Internal,
}

/// A terminal evaluator error with a rendered message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// Factory constructors. Messages are rendered here so call sites stay
// one-liners and wording is consistent across the evaluator.

pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::UndefinedVariable,
        format!("undefined variable ${name}"),
    )
}

pub fn undefined_function(name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::UndefinedFunction,
        format!("call to undefined function {name}()"),
    )
}

pub fn undefined_class(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UndefinedClass, format!("class {name} not found"))
}

pub fn undefined_method(class: &str, method: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::UndefinedMethod,
        format!("call to undefined method {class}::{method}()"),
    )
}

pub fn undefined_property(class: &str, prop: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::UndefinedProperty,
        format!("undefined property {class}::${prop}"),
    )
}

pub fn undefined_constant(name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::UndefinedConstant,
        format!("undefined constant {name}"),
    )
}

pub fn not_callable(what: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::NotCallable,
        format!("value of type {what} is not callable"),
    )
}

pub fn duplicate_argument(param: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::ArgumentBinding,
        format!("argument ${param} bound more than once"),
    )
}

pub fn unknown_named_argument(param: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::ArgumentBinding,
        format!("unknown named argument ${param}"),
    )
}

pub fn missing_argument(param: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::ArgumentBinding,
        format!("missing required argument ${param}"),
    )
}

pub fn argument_type_mismatch(param: &str, expected: &str, got: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::TypeMismatch,
        format!("argument ${param} must be of type {expected}, {got} given"),
    )
}

pub fn visibility_violation(vis: &str, class: &str, member: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::VisibilityViolation,
        format!("cannot access {vis} member {class}::{member}"),
    )
}

pub fn division_by_zero() -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero, "division by zero")
}

pub fn modulo_by_zero() -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero, "modulo by zero")
}

pub fn invalid_operand(op: &str, ty: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidOperand,
        format!("unsupported operand type {ty} for {op}"),
    )
}

pub fn invalid_declaration(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidDeclaration, message)
}

pub fn not_an_object(what: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::NotAnObject,
        format!("attempt to access a member of a non-object ({what})"),
    )
}

pub fn not_iterable(what: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::NotIterable,
        format!("value of type {what} is not iterable"),
    )
}

pub fn internal(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Internal, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_sets_kind_and_message() {
        let err = undefined_function("foo");
        assert_eq!(err.kind, EvalErrorKind::UndefinedFunction);
        assert_eq!(err.message, "call to undefined function foo()");
    }

    #[test]
    fn eval_error_converts_into_signal() {
        let sig: Signal = division_by_zero().into();
        assert!(matches!(
            sig,
            Signal::Error(EvalError {
                kind: EvalErrorKind::DivisionByZero,
                ..
            })
        ));
    }

    #[test]
    fn display_renders_message() {
        assert_eq!(
            visibility_violation("private", "Account", "balance").to_string(),
            "cannot access private member Account::balance"
        );
    }
}
