//! Index types addressing arena pools.
//!
//! All AST children are `u32` indices or ranges, never boxes. Ids are
//! only meaningful for the [`crate::Arena`] that allocated them.

use std::fmt;

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
    /// Index of an expression node.
    ExprId
}
define_id! {
    /// Index of a statement node.
    StmtId
}
define_id! {
    /// Index of a function declaration (free function, method, or closure).
    FuncId
}
define_id! {
    /// Index of a class declaration.
    ClassDeclId
}
define_id! {
    /// Index of an interface declaration.
    InterfaceDeclId
}
define_id! {
    /// Index of a trait declaration.
    TraitDeclId
}

macro_rules! define_range {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        pub struct $name {
            start: u32,
            end: u32,
        }

        impl $name {
            /// Empty range.
            pub const EMPTY: Self = Self { start: 0, end: 0 };

            #[inline]
            pub const fn new(start: u32, end: u32) -> Self {
                Self { start, end }
            }

            #[inline]
            pub const fn start(self) -> usize {
                self.start as usize
            }

            #[inline]
            pub const fn end(self) -> usize {
                self.end as usize
            }

            #[inline]
            pub const fn len(self) -> usize {
                (self.end - self.start) as usize
            }

            #[inline]
            pub const fn is_empty(self) -> bool {
                self.start == self.end
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({}..{})"), self.start, self.end)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::EMPTY
            }
        }
    };
}

define_range! {
    /// Range into the expression-list pool.
    ExprRange
}
define_range! {
    /// Range into the statement-list pool.
    StmtRange
}
define_range! {
    /// Range into the call-argument pool.
    ArgRange
}
define_range! {
    /// Range into the array-entry pool.
    EntryRange
}
define_range! {
    /// Range into the switch-case pool.
    CaseRange
}
define_range! {
    /// Range into the catch-clause pool.
    CatchRange
}
define_range! {
    /// Range into the closure-capture pool.
    CaptureRange
}
define_range! {
    /// Range into the name-list pool.
    NameRange
}
define_range! {
    /// Range into the destructuring-item pool.
    ListItemRange
}
