//! AST node types and arena storage.

mod arena;
mod builder;
mod decl;
mod expr;
mod ids;
mod op;
mod stmt;

pub use arena::Arena;
pub use builder::{Program, ProgramBuilder};
pub use decl::{
    ClassConstDecl, ClassDecl, FunctionDecl, InterfaceDecl, MethodDecl, Param, PropDecl,
    TraitAdaptation, TraitDecl, TraitUse, TypeExpr, TypeHint, Visibility,
};
pub use expr::{Arg, ArrayEntry, Callee, CaptureVar, ClassRef, Expr, ExprKind, ListItem};
pub use ids::{
    ArgRange, CaptureRange, CaseRange, CatchRange, ClassDeclId, EntryRange, ExprId, ExprRange,
    FuncId, InterfaceDeclId, ListItemRange, NameRange, StmtId, StmtRange, TraitDeclId,
};
pub use op::{AssignOp, BinaryOp, CastKind, UnaryOp};
pub use stmt::{CatchClause, Stmt, StmtKind, SwitchCase, UseKind};
