//! Class, interface, and trait definitions and their registry.
//!
//! Definitions live in id-addressed arenas with explicit parent and
//! interface indices. Each class carries a *resolved* member table built
//! once when its declaration executes: the parent's resolved table, then
//! trait compositions, then the class's own members, with method storage
//! shared via `Rc` so inherited methods are pointers into the declaring
//! class, never copies. Abstract-method and interface-implementation
//! checks run at declaration time, not instantiation.

mod bootstrap;
mod def;
mod registry;

use std::fmt;

pub use bootstrap::{bootstrap, CoreClasses};
pub use def::{
    ClassDef, FunctionInfo, InterfaceDef, MemberFlags, MethodBody, MethodDef, NativeFn, PropEntry,
    StaticProp, TraitDef, TraitMethod,
};
pub use registry::{ClassInput, ClassRegistry, MethodInput, PropInput, TraitUseInput};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id! {
    /// Index of a class definition in the registry.
    ClassId
}
define_id! {
    /// Index of an interface definition in the registry.
    InterfaceId
}
define_id! {
    /// Index of a trait definition in the registry.
    TraitId
}
