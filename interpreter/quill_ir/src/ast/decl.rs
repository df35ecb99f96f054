//! Declaration pools: functions, classes, interfaces, traits.
//!
//! Unlike expression and statement nodes, declarations own their member
//! vectors; they are allocated once per declaration and referenced by id
//! from the statement stream.

use super::ids::{ExprId, FuncId, StmtRange};
use crate::{Name, Span};

/// Member visibility.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// A declared parameter or property type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeHint {
    Int,
    Float,
    String,
    Bool,
    Array,
    Object,
    Callable,
    Iterable,
    /// Class or interface name (possibly qualified).
    Named(Name),
}

/// Type annotation with nullability: `?int`, `?Logger`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeExpr {
    pub hint: TypeHint,
    pub nullable: bool,
}

impl TypeExpr {
    pub fn new(hint: TypeHint) -> Self {
        TypeExpr {
            hint,
            nullable: false,
        }
    }

    pub fn nullable(hint: TypeHint) -> Self {
        TypeExpr {
            hint,
            nullable: true,
        }
    }
}

/// One declared parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: Option<TypeExpr>,
    /// Default-value expression. Evaluated once, when the declaration is
    /// executed; the resulting value is reused across calls.
    pub default: Option<ExprId>,
    /// Trailing variadic parameter: `...$rest`.
    pub variadic: bool,
    /// Constructor property promotion: `__construct(private int $x)`.
    pub promote: Option<Visibility>,
}

impl Param {
    /// Plain untyped parameter.
    pub fn new(name: Name) -> Self {
        Param {
            name,
            ty: None,
            default: None,
            variadic: false,
            promote: None,
        }
    }
}

/// A function body: free function, method, or closure.
#[derive(Clone, Debug)]
pub struct FunctionDecl {
    /// Unqualified name; `Name::EMPTY` for closures.
    pub name: Name,
    pub params: Vec<Param>,
    pub body: StmtRange,
    /// Marked by the supplier when the body lexically contains
    /// `yield`/`yield from`.
    pub is_generator: bool,
    pub span: Span,
}

/// One declared property.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PropDecl {
    pub name: Name,
    pub visibility: Visibility,
    pub is_static: bool,
    /// Evaluated once when the class declaration is executed.
    pub default: Option<ExprId>,
}

/// One declared method.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodDecl {
    pub func: FuncId,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
}

/// One class constant.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ClassConstDecl {
    pub name: Name,
    pub value: ExprId,
}

/// Conflict resolution when composing traits.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TraitAdaptation {
    /// `A::m insteadof B;` — take `m` from trait `winner`, suppressing the
    /// same-named method from the other used traits.
    InsteadOf { method: Name, winner: Name },
    /// `A::m as protected n;` — re-expose `m` (optionally from a specific
    /// trait) under a new name and/or visibility.
    Alias {
        method: Name,
        from: Option<Name>,
        alias: Name,
        visibility: Option<Visibility>,
    },
}

/// One `use TraitName { ...adaptations }` clause.
#[derive(Clone, Debug)]
pub struct TraitUse {
    pub name: Name,
    pub adaptations: Vec<TraitAdaptation>,
}

/// Class declaration.
#[derive(Clone, Debug)]
pub struct ClassDecl {
    /// Unqualified name; qualified against the current namespace when the
    /// declaration is executed.
    pub name: Name,
    pub parent: Option<Name>,
    pub interfaces: Vec<Name>,
    pub uses: Vec<TraitUse>,
    pub consts: Vec<ClassConstDecl>,
    pub props: Vec<PropDecl>,
    pub methods: Vec<MethodDecl>,
    pub is_abstract: bool,
    pub is_final: bool,
    pub span: Span,
}

/// Interface declaration. Methods are abstract signatures.
#[derive(Clone, Debug)]
pub struct InterfaceDecl {
    pub name: Name,
    pub extends: Vec<Name>,
    pub consts: Vec<ClassConstDecl>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

/// Trait declaration.
#[derive(Clone, Debug)]
pub struct TraitDecl {
    pub name: Name,
    pub props: Vec<PropDecl>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}
