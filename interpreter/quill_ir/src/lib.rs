//! Quill IR - AST and interning types for the Quill interpreter.
//!
//! This crate defines what the evaluator consumes: arena-allocated
//! expression/statement nodes addressed by `u32` ids and ranges,
//! declaration pools for functions/classes/interfaces/traits, interned
//! [`Name`] identifiers, and the [`ProgramBuilder`] front ends and tests
//! use to assemble a [`Program`].
//!
//! # Design Notes
//!
//! - No `Box<Expr>`: children are `ExprId(u32)`/`StmtId(u32)` indices
//!   into contiguous pools, list children are contiguous runs addressed
//!   by range types.
//! - Identifiers are interned once; comparing two [`Name`]s is a single
//!   `u32` compare, and dynamic names can be interned at runtime through
//!   the shared [`StringInterner`].

mod ast;
mod interner;
mod name;
mod span;

pub use ast::{
    Arena, Arg, ArgRange, ArrayEntry, AssignOp, BinaryOp, Callee, CaptureRange, CaptureVar,
    CaseRange, CastKind, CatchClause, CatchRange, ClassConstDecl, ClassDecl, ClassDeclId,
    ClassRef, EntryRange, Expr, ExprId, ExprKind, ExprRange, FuncId, FunctionDecl, InterfaceDecl,
    InterfaceDeclId, ListItem, ListItemRange, MethodDecl, NameRange, Param, PropDecl, Program,
    ProgramBuilder, Stmt, StmtId, StmtKind, StmtRange, SwitchCase,
    TraitAdaptation, TraitDecl, TraitDeclId, TraitUse, TypeExpr, TypeHint, UnaryOp, UseKind,
    Visibility,
};
pub use interner::StringInterner;
pub use name::Name;
pub use span::Span;
