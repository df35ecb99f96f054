//! Definition records for callables, classes, interfaces, and traits.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use quill_ir::{Name, Param, StmtRange, Visibility};

use crate::classes::{ClassId, InterfaceId};
use crate::environment::Slot;
use crate::signal::ExecResult;
use crate::value::{ObjRef, Value};

bitflags! {
    /// Method modifier set.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MemberFlags: u8 {
        const STATIC = 1 << 0;
        const ABSTRACT = 1 << 1;
        const FINAL = 1 << 2;
    }
}

/// The executable shape of a function, method, or closure body.
///
/// Parameters are copied out of the AST at declaration time, and default
/// values are evaluated exactly once, here — calls reuse the stored
/// values verbatim.
#[derive(Debug)]
pub struct FunctionInfo {
    /// Fully qualified name; `Name::EMPTY` for closures.
    pub name: Name,
    pub params: Vec<Param>,
    /// Evaluated default per parameter, `None` where the parameter has
    /// no default.
    pub defaults: Vec<Option<Value>>,
    pub body: StmtRange,
    pub is_generator: bool,
}

/// A native (Rust-implemented) instance method, used by the bootstrapped
/// exception classes. Receives the bound `$this` and the evaluated
/// argument list.
pub type NativeFn = fn(&mut crate::interp::Interpreter<'_>, &ObjRef, &[Value]) -> ExecResult;

/// How a method executes.
#[derive(Clone)]
pub enum MethodBody {
    User(Rc<FunctionInfo>),
    Native(NativeFn),
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodBody::User(info) => f.debug_tuple("User").field(&info.name).finish(),
            MethodBody::Native(_) => f.write_str("Native"),
        }
    }
}

/// One resolved method: body plus modifiers plus the class that declared
/// it (the anchor for `private`/`protected` checks and `parent::`).
#[derive(Debug)]
pub struct MethodDef {
    pub name: Name,
    pub body: MethodBody,
    pub visibility: Visibility,
    pub flags: MemberFlags,
    pub declared_in: ClassId,
}

impl MethodDef {
    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.contains(MemberFlags::ABSTRACT)
    }

    pub fn is_final(&self) -> bool {
        self.flags.contains(MemberFlags::FINAL)
    }
}

/// One resolved instance property: declaration-time default plus
/// visibility, in declaration order (parent first).
#[derive(Clone, Debug)]
pub struct PropEntry {
    pub name: Name,
    pub visibility: Visibility,
    pub default: Value,
    pub declared_in: ClassId,
}

/// One resolved static property. The slot is `Rc`-shared with
/// subclasses unless they redeclare the property, so a write through
/// either class name is visible through both.
#[derive(Clone, Debug)]
pub struct StaticProp {
    pub slot: Slot,
    pub visibility: Visibility,
    pub declared_in: ClassId,
}

/// A fully resolved class.
///
/// `methods`, `props`, `consts`, and `statics` are flattened over the
/// inheritance chain at declaration time; lookups never walk parents.
/// Static slots are `Rc`-shared with the parent unless redeclared, so a
/// subclass observes writes to an inherited static.
#[derive(Debug)]
pub struct ClassDef {
    pub name: Name,
    pub parent: Option<ClassId>,
    /// Directly implemented interfaces; `instanceof` walks the parent
    /// chain and each interface's `extends` closure.
    pub interfaces: Vec<InterfaceId>,
    pub is_abstract: bool,
    pub is_final: bool,
    pub methods: FxHashMap<Name, Rc<MethodDef>>,
    pub props: Vec<PropEntry>,
    pub consts: FxHashMap<Name, Value>,
    pub statics: FxHashMap<Name, StaticProp>,
}

/// An interface: a set of required method names plus constants.
///
/// Interfaces carry no bodies; requirement checking happens when a
/// concrete class declares that it implements one.
#[derive(Debug)]
pub struct InterfaceDef {
    pub name: Name,
    pub extends: Vec<InterfaceId>,
    pub methods: Vec<Name>,
    pub consts: FxHashMap<Name, Value>,
}

/// One method a trait provides, before composition. The declaring class
/// is assigned when the trait is composed into a class.
#[derive(Clone, Debug)]
pub struct TraitMethod {
    pub name: Name,
    pub func: Rc<FunctionInfo>,
    pub visibility: Visibility,
    pub flags: MemberFlags,
}

/// A trait: methods and properties to be copied into using classes,
/// subject to `insteadof`/`as` adaptations.
#[derive(Debug)]
pub struct TraitDef {
    pub name: Name,
    pub methods: Vec<TraitMethod>,
    pub props: Vec<(Name, Visibility, Value)>,
}
