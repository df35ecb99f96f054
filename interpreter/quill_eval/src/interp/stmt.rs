//! Statement dispatch.
//!
//! Every statement evaluates to `Result<Value, Signal>`. The `?`
//! operator gives unchanged propagation through constructs that do not
//! consume a signal; loops, `switch`, and `try` match explicitly on the
//! kinds they handle and re-raise the rest. The match arms on `Signal`
//! are exhaustive, so a construct cannot forget a signal kind.

use quill_ir::{CatchClause, CatchRange, CaseRange, ExprId, Name, StmtId, StmtKind, StmtRange, UseKind};

use crate::interp::Interpreter;
use crate::signal::{not_iterable, ExecResult, Signal};
use crate::value::compare::loose_eq;
use crate::value::convert::truthy;
use crate::value::{ArrayKey, Value};

/// Whether a loop iteration ended normally or consumed a `break`.
enum LoopStep {
    Continue,
    Stop,
}

impl Interpreter<'_> {
    /// Execute a statement list, yielding the last statement's value.
    pub(crate) fn exec_block(&mut self, range: StmtRange) -> ExecResult {
        // The arena outlives the interpreter borrow, so the id slice can
        // be iterated while statements execute.
        let ids = self.program().arena.stmt_list(range);
        let mut last = Value::Null;
        for &id in ids {
            last = self.exec_stmt(id)?;
        }
        Ok(last)
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn exec_stmt(&mut self, id: StmtId) -> ExecResult {
        let stmt = *self.program().arena.stmt(id);
        match stmt.kind {
            StmtKind::Expr(expr) => self.eval_expr(expr),
            StmtKind::Echo(operands) => {
                for &id in self.program().arena.expr_list(operands) {
                    let value = self.eval_expr(id)?;
                    let text = self.coerce_string(&value)?;
                    self.write_output(&text);
                }
                Ok(Value::Null)
            }
            StmtKind::Block(body) => self.exec_block(body),

            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.eval_expr(cond)?;
                if truthy(&cond) {
                    self.exec_block(then_branch)
                } else {
                    self.exec_block(else_branch)
                }
            }
            StmtKind::While { cond, body } => {
                loop {
                    let cond = self.eval_expr(cond)?;
                    if !truthy(&cond) {
                        break;
                    }
                    match self.run_loop_body(body)? {
                        LoopStep::Continue => {}
                        LoopStep::Stop => break,
                    }
                }
                Ok(Value::Null)
            }
            StmtKind::DoWhile { body, cond } => {
                loop {
                    match self.run_loop_body(body)? {
                        LoopStep::Continue => {}
                        LoopStep::Stop => break,
                    }
                    let cond = self.eval_expr(cond)?;
                    if !truthy(&cond) {
                        break;
                    }
                }
                Ok(Value::Null)
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                let arena = &self.program().arena;
                let init = arena.expr_list(init);
                let cond = arena.expr_list(cond);
                let step = arena.expr_list(step);
                for &expr in init {
                    self.eval_expr(expr)?;
                }
                loop {
                    // The last condition expression decides; an empty
                    // list loops until broken.
                    let mut keep_going = true;
                    for &expr in cond {
                        keep_going = truthy(&self.eval_expr(expr)?);
                    }
                    if !keep_going {
                        break;
                    }
                    match self.run_loop_body(body)? {
                        LoopStep::Continue => {}
                        LoopStep::Stop => break,
                    }
                    for &expr in step {
                        self.eval_expr(expr)?;
                    }
                }
                Ok(Value::Null)
            }
            StmtKind::Foreach {
                subject,
                key,
                value,
                body,
            } => self.exec_foreach(subject, key, value, body),
            StmtKind::Switch { subject, cases } => self.exec_switch(subject, cases),

            StmtKind::Break { levels } => Err(Signal::Break(levels.max(1))),
            StmtKind::Continue { levels } => Err(Signal::Continue(levels.max(1))),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Err(Signal::Return(value))
            }
            StmtKind::Throw(expr) => {
                let value = self.eval_expr(expr)?;
                self.throw_value(value)
            }
            StmtKind::Try {
                body,
                catches,
                finally,
            } => self.exec_try(body, catches, finally),

            StmtKind::Global(names) => {
                for &name in self.program().arena.names(names) {
                    self.import_global(name);
                }
                Ok(Value::Null)
            }
            StmtKind::Unset(targets) => {
                for &id in self.program().arena.expr_list(targets) {
                    self.unset_target(id)?;
                }
                Ok(Value::Null)
            }

            StmtKind::Function(func) => self.declare_function(func),
            StmtKind::Class(decl) => self.declare_class(decl),
            StmtKind::Interface(decl) => self.declare_interface(decl),
            StmtKind::Trait(decl) => self.declare_trait(decl),
            StmtKind::Const { name, value } => {
                let value = self.eval_expr(value)?;
                let qualified = self.namespace().qualify(name, self.interner());
                self.define_constant(qualified, value)?;
                Ok(Value::Null)
            }

            StmtKind::Namespace(name) => {
                self.namespace_mut().enter(name);
                Ok(Value::Null)
            }
            StmtKind::Use { kind, path, alias } => {
                self.namespace_mut().add_use(kind, path, alias);
                Ok(Value::Null)
            }
        }
    }

    /// Throwing requires an object of a class implementing `Throwable`.
    fn throw_value(&mut self, value: Value) -> ExecResult {
        match &value {
            Value::Object(obj) => {
                let class = obj.borrow().class;
                if self.registry().implements(class, self.core().throwable) {
                    Err(Signal::Thrown(value))
                } else {
                    let name = self.registry().class_name(class);
                    Err(crate::signal::invalid_operand(
                        "throw",
                        self.interner().lookup(name),
                    )
                    .into())
                }
            }
            other => Err(crate::signal::invalid_operand("throw", other.type_name()).into()),
        }
    }

    /// Run a loop body once. `Break`/`Continue` addressed at this loop
    /// (level 1) are consumed here; deeper levels re-raise decremented
    /// by one. Every other signal propagates unchanged.
    fn run_loop_body(&mut self, body: StmtRange) -> Result<LoopStep, Signal> {
        match self.exec_block(body) {
            Ok(_) => Ok(LoopStep::Continue),
            Err(Signal::Break(n)) => {
                if n <= 1 {
                    Ok(LoopStep::Stop)
                } else {
                    Err(Signal::Break(n - 1))
                }
            }
            Err(Signal::Continue(n)) => {
                if n <= 1 {
                    Ok(LoopStep::Continue)
                } else {
                    Err(Signal::Continue(n - 1))
                }
            }
            Err(other) => Err(other),
        }
    }

    fn exec_foreach(
        &mut self,
        subject: ExprId,
        key: Option<Name>,
        value_var: Name,
        body: StmtRange,
    ) -> ExecResult {
        let subject = self.eval_expr(subject)?;
        // Iteration walks a snapshot: mutating the subject inside the
        // body does not affect the traversal.
        let entries: Vec<(ArrayKey, Value)> = match &subject {
            Value::Array(array) => array.entries().to_vec(),
            Value::Generator(generator) => generator.entries.clone(),
            other => return Err(not_iterable(other.type_name()).into()),
        };
        for (entry_key, entry_value) in entries {
            if let Some(key_var) = key {
                self.env_mut().set(key_var, entry_key.to_value());
            }
            self.env_mut().set(value_var, entry_value);
            match self.run_loop_body(body)? {
                LoopStep::Continue => {}
                LoopStep::Stop => break,
            }
        }
        Ok(Value::Null)
    }

    fn exec_switch(&mut self, subject: ExprId, cases: CaseRange) -> ExecResult {
        let subject = self.eval_expr(subject)?;
        let cases = self.program().arena.cases(cases);

        // Find the first loosely equal arm, falling back to `default`.
        // Case conditions past the match are never evaluated.
        let mut start = None;
        let mut default = None;
        for (i, case) in cases.iter().enumerate() {
            match case.cond {
                Some(cond) => {
                    let candidate = self.eval_expr(cond)?;
                    if loose_eq(&subject, &candidate) {
                        start = Some(i);
                        break;
                    }
                }
                None => default = Some(i),
            }
        }
        let Some(start) = start.or(default) else {
            return Ok(Value::Null);
        };

        // Fall through subsequent arms until a break is consumed. The
        // switch counts as one breakable level.
        for case in &cases[start..] {
            match self.exec_block(case.body) {
                Ok(_) => {}
                Err(Signal::Break(n)) => {
                    if n <= 1 {
                        return Ok(Value::Null);
                    }
                    return Err(Signal::Break(n - 1));
                }
                Err(other) => return Err(other),
            }
        }
        Ok(Value::Null)
    }

    fn exec_try(
        &mut self,
        body: StmtRange,
        catches: CatchRange,
        finally: Option<StmtRange>,
    ) -> ExecResult {
        let mut result = self.exec_block(body);

        let thrown = match &result {
            Err(Signal::Thrown(exception)) => Some(exception.clone()),
            _ => None,
        };
        if let Some(exception) = thrown {
            let clauses: &[CatchClause] = self.program().arena.catches(catches);
            for clause in clauses {
                if self.catch_matches(clause, &exception) {
                    self.env_mut().set(clause.var, exception.clone());
                    result = self.exec_block(clause.body);
                    break;
                }
            }
        }

        // `finally` runs exactly once and overrides the propagating
        // result only by returning, throwing, or exiting itself.
        if let Some(finally) = finally {
            self.exec_block(finally)?;
        }
        result
    }

    /// A catch arm matches when the thrown object is an instance of the
    /// arm's declared class or interface.
    fn catch_matches(&mut self, clause: &CatchClause, exception: &Value) -> bool {
        let Value::Object(obj) = exception else {
            return false;
        };
        let class = obj.borrow().class;
        let resolved = self
            .namespace()
            .resolve(UseKind::Type, clause.class, self.interner());
        for candidate in std::iter::once(resolved.primary).chain(resolved.fallback) {
            if let Some(target) = self.registry().class_id(candidate) {
                return self.registry().is_subclass_or_self(class, target);
            }
            if let Some(iface) = self.registry().interface_id(candidate) {
                return self.registry().implements(class, iface);
            }
        }
        false
    }
}
