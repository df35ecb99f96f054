//! Quill Eval - tree-walking evaluator for the Quill interpreter.
//!
//! Executes the arena-allocated AST from `quill_ir`: a dynamically typed,
//! class-based scripting language with closures, single inheritance with
//! interfaces and traits, magic-method dispatch, eagerly materialized
//! generators, and namespaces.
//!
//! # Architecture
//!
//! - `value` — the [`Value`] tagged union, ordered arrays, conversions,
//!   and the loose/strict/three-way comparison rules
//! - `signal` — [`ExecResult`] with the control-flow sum ([`Signal`]) in
//!   the `Err` arm, threaded through every evaluation function
//! - `environment` — per-call-frame variable tables with slot aliasing
//!   for `global` imports and by-reference captures
//! - `classes` — id-addressed class/interface/trait registry with
//!   resolved member tables built at declaration time
//! - `binder` — positional/named/variadic/spread argument binding with
//!   declared-type checks
//! - `interp` — the [`Interpreter`]: statement/expression dispatch,
//!   lvalue assignment, call and method resolution, generator collection
//!
//! Everything mutable belongs to one [`Interpreter`] instance; there is
//! no process-global state.

mod binder;
mod builtins;
mod classes;
mod environment;
mod interp;
mod namespace;
mod operators;
mod output;
pub mod signal;
mod value;

#[cfg(test)]
mod tests;

pub use binder::{bind_arguments, BindContext, CallArg};
pub use builtins::{BuiltinDef, BuiltinFn, BuiltinRegistry};
pub use classes::{
    ClassDef, ClassId, ClassInput, ClassRegistry, CoreClasses, FunctionInfo, InterfaceId,
    MemberFlags, MethodBody, MethodDef, PropEntry, StaticProp, TraitId,
};
pub use environment::{new_slot, Environment, Slot};
pub use interp::{Halt, Interpreter};
pub use namespace::{NamespaceContext, Resolved};
pub use operators::{evaluate_binary, evaluate_cast, evaluate_unary};
pub use output::{buffer_output, silent_output, stdout_output, OutputHandler, SharedOutput};
pub use signal::{EvalError, EvalErrorKind, ExecResult, Signal};
pub use value::{
    ArrayKey, ArrayValue, ClosureValue, GeneratorValue, ObjRef, ObjectData, PropMap,
    ResourceValue, Value,
};
