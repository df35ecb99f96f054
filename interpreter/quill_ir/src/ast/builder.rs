//! Program assembly.
//!
//! `ProgramBuilder` is the surface a front end (or a test) uses to put a
//! [`Program`] together: it owns the interner and the arena and offers
//! one helper per node kind. All synthesized nodes carry `Span::DUMMY`;
//! a parser that tracks real spans can allocate through the arena
//! directly.

use super::decl::{ClassDecl, FunctionDecl, InterfaceDecl, Param, TraitDecl};
use super::expr::{Arg, ArrayEntry, Callee, CaptureVar, ClassRef, Expr, ExprKind, ListItem};
use super::ids::{ClassDeclId, ExprId, FuncId, InterfaceDeclId, StmtId, StmtRange, TraitDeclId};
use super::op::{AssignOp, BinaryOp, CastKind, UnaryOp};
use super::stmt::{CatchClause, Stmt, StmtKind, SwitchCase, UseKind};
use crate::{Arena, Name, Span, StringInterner};

/// A complete program: interner, arena, top-level statements.
#[derive(Debug)]
pub struct Program {
    pub interner: StringInterner,
    pub arena: Arena,
    pub body: StmtRange,
    /// Enables strict parameter-type checking in the evaluator.
    pub strict_types: bool,
}

/// Builder for [`Program`] values.
pub struct ProgramBuilder {
    interner: StringInterner,
    arena: Arena,
    strict_types: bool,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        ProgramBuilder {
            interner: StringInterner::new(),
            arena: Arena::new(),
            strict_types: false,
        }
    }

    /// Enable strict parameter-type checking.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict_types = true;
        self
    }

    /// Intern a name.
    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Direct arena access for callers that outgrow the helpers.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Consume the builder, producing a program whose body is `body`.
    pub fn finish(mut self, body: Vec<StmtId>) -> Program {
        let body = self.arena.alloc_stmt_list(body);
        Program {
            interner: self.interner,
            arena: self.arena,
            body,
            strict_types: self.strict_types,
        }
    }

    // Expressions

    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        self.arena.alloc_expr(Expr::new(kind, Span::DUMMY))
    }

    pub fn null(&mut self) -> ExprId {
        self.expr(ExprKind::Null)
    }

    pub fn bool(&mut self, b: bool) -> ExprId {
        self.expr(ExprKind::Bool(b))
    }

    pub fn int(&mut self, n: i64) -> ExprId {
        self.expr(ExprKind::Int(n))
    }

    pub fn float(&mut self, f: f64) -> ExprId {
        self.expr(ExprKind::Float(f.to_bits()))
    }

    pub fn str(&mut self, s: &str) -> ExprId {
        let name = self.name(s);
        self.expr(ExprKind::String(name))
    }

    pub fn var(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Var(name))
    }

    pub fn const_fetch(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::ConstFetch(name))
    }

    /// Array literal from `(key, value)` pairs; `None` keys auto-index.
    pub fn array(&mut self, entries: Vec<(Option<ExprId>, ExprId)>) -> ExprId {
        let entries = self
            .arena
            .alloc_entries(entries.into_iter().map(|(key, value)| ArrayEntry { key, value }));
        self.expr(ExprKind::Array(entries))
    }

    /// Destructuring pattern from `(key, target)` items; `None` targets
    /// are skipped positions.
    pub fn list(&mut self, items: Vec<(Option<ExprId>, Option<ExprId>)>) -> ExprId {
        let items = self
            .arena
            .alloc_list_items(items.into_iter().map(|(key, target)| ListItem { key, target }));
        self.expr(ExprKind::List(items))
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> ExprId {
        self.expr(ExprKind::Assign { target, value })
    }

    /// `$name = value`
    pub fn assign_var(&mut self, name: &str, value: ExprId) -> ExprId {
        let target = self.var(name);
        self.assign(target, value)
    }

    pub fn assign_op(&mut self, op: AssignOp, target: ExprId, value: ExprId) -> ExprId {
        self.expr(ExprKind::AssignCompound { op, target, value })
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, left, right })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Unary { op, operand })
    }

    pub fn ternary(
        &mut self,
        cond: ExprId,
        then_branch: Option<ExprId>,
        else_branch: ExprId,
    ) -> ExprId {
        self.expr(ExprKind::Ternary {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn cast(&mut self, kind: CastKind, expr: ExprId) -> ExprId {
        self.expr(ExprKind::Cast { kind, expr })
    }

    pub fn isset(&mut self, operands: Vec<ExprId>) -> ExprId {
        let operands = self.arena.alloc_expr_list(operands);
        self.expr(ExprKind::Isset(operands))
    }

    pub fn empty(&mut self, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Empty(operand))
    }

    /// `base[index]`; pass `None` for the append position `base[]`.
    pub fn index(&mut self, base: ExprId, index: Option<ExprId>) -> ExprId {
        self.expr(ExprKind::Index { base, index })
    }

    pub fn prop(&mut self, base: ExprId, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Prop { base, name })
    }

    pub fn static_prop(&mut self, class: ClassRef, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::StaticProp { class, name })
    }

    pub fn class_const(&mut self, class: ClassRef, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::ClassConst { class, name })
    }

    /// `ClassRef::Named` from a string.
    pub fn class_ref(&self, name: &str) -> ClassRef {
        ClassRef::Named(self.name(name))
    }

    /// Free call by name: `foo(args)`.
    pub fn call(&mut self, name: &str, args: Vec<Arg>) -> ExprId {
        let callee = Callee::Name(self.name(name));
        let args = self.arena.alloc_args(args);
        self.expr(ExprKind::Call { callee, args })
    }

    /// Computed call: `$f(args)`.
    pub fn call_expr(&mut self, callee: ExprId, args: Vec<Arg>) -> ExprId {
        let args = self.arena.alloc_args(args);
        self.expr(ExprKind::Call {
            callee: Callee::Expr(callee),
            args,
        })
    }

    pub fn method_call(&mut self, receiver: ExprId, method: &str, args: Vec<Arg>) -> ExprId {
        let method = self.name(method);
        let args = self.arena.alloc_args(args);
        self.expr(ExprKind::MethodCall {
            receiver,
            method,
            args,
        })
    }

    pub fn static_call(&mut self, class: ClassRef, method: &str, args: Vec<Arg>) -> ExprId {
        let method = self.name(method);
        let args = self.arena.alloc_args(args);
        self.expr(ExprKind::StaticCall {
            class,
            method,
            args,
        })
    }

    pub fn new_object(&mut self, class: ClassRef, args: Vec<Arg>) -> ExprId {
        let args = self.arena.alloc_args(args);
        self.expr(ExprKind::New { class, args })
    }

    pub fn clone_expr(&mut self, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Clone(operand))
    }

    pub fn instance_of(&mut self, expr: ExprId, class: ClassRef) -> ExprId {
        self.expr(ExprKind::InstanceOf { expr, class })
    }

    pub fn closure(&mut self, func: FuncId, captures: Vec<CaptureVar>) -> ExprId {
        let captures = self.arena.alloc_captures(captures);
        self.expr(ExprKind::Closure { func, captures })
    }

    /// Capture by value.
    pub fn capture(&self, name: &str) -> CaptureVar {
        CaptureVar {
            name: self.name(name),
            by_ref: false,
        }
    }

    /// Capture by reference.
    pub fn capture_ref(&self, name: &str) -> CaptureVar {
        CaptureVar {
            name: self.name(name),
            by_ref: true,
        }
    }

    pub fn yield_value(&mut self, key: Option<ExprId>, value: Option<ExprId>) -> ExprId {
        self.expr(ExprKind::Yield { key, value })
    }

    pub fn yield_from(&mut self, operand: ExprId) -> ExprId {
        self.expr(ExprKind::YieldFrom(operand))
    }

    pub fn exit(&mut self, operand: Option<ExprId>) -> ExprId {
        self.expr(ExprKind::Exit(operand))
    }

    /// Positional argument.
    pub fn arg(&self, value: ExprId) -> Arg {
        Arg::positional(value)
    }

    /// Named argument.
    pub fn named_arg(&self, name: &str, value: ExprId) -> Arg {
        Arg::named(self.name(name), value)
    }

    /// Spread argument.
    pub fn spread_arg(&self, value: ExprId) -> Arg {
        Arg::spread(value)
    }

    // Statements

    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        self.arena.alloc_stmt(Stmt::new(kind, Span::DUMMY))
    }

    pub fn stmts(&mut self, stmts: Vec<StmtId>) -> StmtRange {
        self.arena.alloc_stmt_list(stmts)
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn echo(&mut self, operands: Vec<ExprId>) -> StmtId {
        let operands = self.arena.alloc_expr_list(operands);
        self.stmt(StmtKind::Echo(operands))
    }

    pub fn if_stmt(
        &mut self,
        cond: ExprId,
        then_branch: Vec<StmtId>,
        else_branch: Vec<StmtId>,
    ) -> StmtId {
        let then_branch = self.arena.alloc_stmt_list(then_branch);
        let else_branch = self.arena.alloc_stmt_list(else_branch);
        self.stmt(StmtKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn while_stmt(&mut self, cond: ExprId, body: Vec<StmtId>) -> StmtId {
        let body = self.arena.alloc_stmt_list(body);
        self.stmt(StmtKind::While { cond, body })
    }

    pub fn do_while(&mut self, body: Vec<StmtId>, cond: ExprId) -> StmtId {
        let body = self.arena.alloc_stmt_list(body);
        self.stmt(StmtKind::DoWhile { body, cond })
    }

    pub fn for_stmt(
        &mut self,
        init: Vec<ExprId>,
        cond: Vec<ExprId>,
        step: Vec<ExprId>,
        body: Vec<StmtId>,
    ) -> StmtId {
        let init = self.arena.alloc_expr_list(init);
        let cond = self.arena.alloc_expr_list(cond);
        let step = self.arena.alloc_expr_list(step);
        let body = self.arena.alloc_stmt_list(body);
        self.stmt(StmtKind::For {
            init,
            cond,
            step,
            body,
        })
    }

    pub fn foreach(
        &mut self,
        subject: ExprId,
        key: Option<&str>,
        value: &str,
        body: Vec<StmtId>,
    ) -> StmtId {
        let key = key.map(|k| self.name(k));
        let value = self.name(value);
        let body = self.arena.alloc_stmt_list(body);
        self.stmt(StmtKind::Foreach {
            subject,
            key,
            value,
            body,
        })
    }

    /// Switch from `(cond, body)` arms; `None` cond is `default:`.
    pub fn switch(
        &mut self,
        subject: ExprId,
        cases: Vec<(Option<ExprId>, Vec<StmtId>)>,
    ) -> StmtId {
        let cases: Vec<SwitchCase> = cases
            .into_iter()
            .map(|(cond, body)| {
                let body = self.arena.alloc_stmt_list(body);
                SwitchCase { cond, body }
            })
            .collect();
        let cases = self.arena.alloc_cases(cases);
        self.stmt(StmtKind::Switch { subject, cases })
    }

    pub fn break_stmt(&mut self, levels: u32) -> StmtId {
        self.stmt(StmtKind::Break { levels })
    }

    pub fn continue_stmt(&mut self, levels: u32) -> StmtId {
        self.stmt(StmtKind::Continue { levels })
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(value))
    }

    pub fn throw(&mut self, value: ExprId) -> StmtId {
        self.stmt(StmtKind::Throw(value))
    }

    /// Try from `(class, var, body)` catch clauses.
    pub fn try_stmt(
        &mut self,
        body: Vec<StmtId>,
        catches: Vec<(&str, &str, Vec<StmtId>)>,
        finally: Option<Vec<StmtId>>,
    ) -> StmtId {
        let body = self.arena.alloc_stmt_list(body);
        let catches: Vec<CatchClause> = catches
            .into_iter()
            .map(|(class, var, clause_body)| {
                let clause_body = self.arena.alloc_stmt_list(clause_body);
                CatchClause {
                    class: self.name(class),
                    var: self.name(var),
                    body: clause_body,
                }
            })
            .collect();
        let catches = self.arena.alloc_catches(catches);
        let finally = finally.map(|f| self.arena.alloc_stmt_list(f));
        self.stmt(StmtKind::Try {
            body,
            catches,
            finally,
        })
    }

    pub fn global(&mut self, names: Vec<&str>) -> StmtId {
        let names: Vec<Name> = names.into_iter().map(|n| self.name(n)).collect();
        let names = self.arena.alloc_names(names);
        self.stmt(StmtKind::Global(names))
    }

    pub fn unset(&mut self, targets: Vec<ExprId>) -> StmtId {
        let targets = self.arena.alloc_expr_list(targets);
        self.stmt(StmtKind::Unset(targets))
    }

    /// Allocate a function declaration (for methods and closures).
    pub fn func(
        &mut self,
        name: &str,
        params: Vec<Param>,
        body: Vec<StmtId>,
        is_generator: bool,
    ) -> FuncId {
        let name = self.name(name);
        let body = self.arena.alloc_stmt_list(body);
        self.arena.alloc_func(FunctionDecl {
            name,
            params,
            body,
            is_generator,
            span: Span::DUMMY,
        })
    }

    /// Declare a free function as a statement.
    pub fn function(
        &mut self,
        name: &str,
        params: Vec<Param>,
        body: Vec<StmtId>,
        is_generator: bool,
    ) -> StmtId {
        let func = self.func(name, params, body, is_generator);
        self.stmt(StmtKind::Function(func))
    }

    /// Plain untyped parameter.
    pub fn param(&self, name: &str) -> Param {
        Param::new(self.name(name))
    }

    pub fn class(&mut self, decl: ClassDecl) -> StmtId {
        let id: ClassDeclId = self.arena.alloc_class(decl);
        self.stmt(StmtKind::Class(id))
    }

    pub fn interface(&mut self, decl: InterfaceDecl) -> StmtId {
        let id: InterfaceDeclId = self.arena.alloc_interface(decl);
        self.stmt(StmtKind::Interface(id))
    }

    pub fn trait_stmt(&mut self, decl: TraitDecl) -> StmtId {
        let id: TraitDeclId = self.arena.alloc_trait(decl);
        self.stmt(StmtKind::Trait(id))
    }

    pub fn const_stmt(&mut self, name: &str, value: ExprId) -> StmtId {
        let name = self.name(name);
        self.stmt(StmtKind::Const { name, value })
    }

    pub fn namespace(&mut self, name: &str) -> StmtId {
        let name = self.name(name);
        self.stmt(StmtKind::Namespace(name))
    }

    /// `use` declaration; `alias` defaults to the last path segment.
    pub fn use_decl(&mut self, kind: UseKind, path: &str, alias: Option<&str>) -> StmtId {
        let alias = match alias {
            Some(a) => self.name(a),
            None => self.name(path.rsplit('\\').next().unwrap_or(path)),
        };
        let path = self.name(path);
        self.stmt(StmtKind::Use { kind, path, alias })
    }
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_produces_program_with_body() {
        let mut b = ProgramBuilder::new();
        let one = b.int(1);
        let s = b.expr_stmt(one);
        let program = b.finish(vec![s]);
        assert_eq!(program.body.len(), 1);
        assert!(!program.strict_types);
    }

    #[test]
    fn strict_flag_is_carried() {
        let b = ProgramBuilder::new().strict();
        let program = b.finish(vec![]);
        assert!(program.strict_types);
    }

    #[test]
    fn use_alias_defaults_to_last_segment() {
        let mut b = ProgramBuilder::new();
        let s = b.use_decl(UseKind::Type, "App\\Util\\Logger", None);
        let program = b.finish(vec![s]);
        let stmt_id = program.arena.stmt_list(program.body)[0];
        match program.arena.stmt(stmt_id).kind {
            StmtKind::Use { alias, .. } => {
                assert_eq!(program.interner.lookup(alias), "Logger");
            }
            other => panic!("expected use statement, got {other:?}"),
        }
    }

    #[test]
    fn float_literal_round_trips_through_bits() {
        let mut b = ProgramBuilder::new();
        let f = b.float(3.25);
        let program = b.finish(vec![]);
        match program.arena.expr(f).kind {
            ExprKind::Float(bits) => assert_eq!(f64::from_bits(bits), 3.25),
            other => panic!("expected float literal, got {other:?}"),
        }
    }
}
