//! Arena storage for AST nodes.
//!
//! Nodes live in contiguous pools addressed by the id/range types in
//! [`super::ids`]. List-shaped children (argument lists, statement bodies,
//! array entries, …) are allocated as contiguous runs in dedicated pools
//! and addressed by range.

use super::decl::{ClassDecl, FunctionDecl, InterfaceDecl, TraitDecl};
use super::expr::{Arg, ArrayEntry, CaptureVar, Expr, ListItem};
use super::ids::{
    ArgRange, CaseRange, CatchRange, CaptureRange, ClassDeclId, EntryRange, ExprId, ExprRange,
    FuncId, InterfaceDeclId, ListItemRange, NameRange, StmtId, StmtRange, TraitDeclId,
};
use super::stmt::{CatchClause, Stmt, SwitchCase};
use crate::Name;

/// AST arena: every node of one program lives here.
#[derive(Default, Debug)]
pub struct Arena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,

    expr_lists: Vec<ExprId>,
    stmt_lists: Vec<StmtId>,
    args: Vec<Arg>,
    entries: Vec<ArrayEntry>,
    cases: Vec<SwitchCase>,
    catches: Vec<CatchClause>,
    captures: Vec<CaptureVar>,
    name_lists: Vec<Name>,
    list_items: Vec<ListItem>,

    funcs: Vec<FunctionDecl>,
    classes: Vec<ClassDecl>,
    interfaces: Vec<InterfaceDecl>,
    traits: Vec<TraitDecl>,
}

macro_rules! pool_range {
    ($alloc:ident, $get:ident, $field:ident, $elem:ty, $range:ty) => {
        pub fn $alloc(&mut self, items: impl IntoIterator<Item = $elem>) -> $range {
            let start = self.$field.len() as u32;
            self.$field.extend(items);
            let end = self.$field.len() as u32;
            <$range>::new(start, end)
        }

        #[inline]
        pub fn $get(&self, range: $range) -> &[$elem] {
            &self.$field[range.start()..range.end()]
        }
    };
}

macro_rules! pool_id {
    ($alloc:ident, $get:ident, $field:ident, $elem:ty, $id:ty) => {
        pub fn $alloc(&mut self, item: $elem) -> $id {
            let id = <$id>::new(self.$field.len() as u32);
            self.$field.push(item);
            id
        }

        #[inline]
        pub fn $get(&self, id: $id) -> &$elem {
            &self.$field[id.index()]
        }
    };
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pool_id!(alloc_expr, expr, exprs, Expr, ExprId);
    pool_id!(alloc_stmt, stmt, stmts, Stmt, StmtId);
    pool_id!(alloc_func, func, funcs, FunctionDecl, FuncId);
    pool_id!(alloc_class, class, classes, ClassDecl, ClassDeclId);
    pool_id!(
        alloc_interface,
        interface,
        interfaces,
        InterfaceDecl,
        InterfaceDeclId
    );
    pool_id!(alloc_trait, trait_decl, traits, TraitDecl, TraitDeclId);

    pool_range!(alloc_expr_list, expr_list, expr_lists, ExprId, ExprRange);
    pool_range!(alloc_stmt_list, stmt_list, stmt_lists, StmtId, StmtRange);
    pool_range!(alloc_args, args, args, Arg, ArgRange);
    pool_range!(alloc_entries, entries, entries, ArrayEntry, EntryRange);
    pool_range!(alloc_cases, cases, cases, SwitchCase, CaseRange);
    pool_range!(alloc_catches, catches, catches, CatchClause, CatchRange);
    pool_range!(
        alloc_captures,
        captures,
        captures,
        CaptureVar,
        CaptureRange
    );
    pool_range!(alloc_names, names, name_lists, Name, NameRange);
    pool_range!(
        alloc_list_items,
        list_items,
        list_items,
        ListItem,
        ListItemRange
    );

    /// Number of expression nodes allocated.
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Number of statement nodes allocated.
    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}
