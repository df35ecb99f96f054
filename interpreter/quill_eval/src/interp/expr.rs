//! Expression dispatch.
//!
//! Operator value semantics live in [`crate::operators`]; this module
//! owns everything that needs evaluation order or interpreter state:
//! short-circuiting, string coercion through `__toString`, property and
//! index reads, `isset`-style quiet evaluation, and yield collection.

use quill_ir::{BinaryOp, CastKind, ExprId, ExprKind, Name, UseKind};

use crate::interp::{Interpreter, MagicKind};
use crate::operators::{evaluate_binary, evaluate_cast, evaluate_unary};
use crate::signal::{
    internal, not_iterable, undefined_constant, visibility_violation, EvalError, EvalErrorKind,
    ExecResult, Signal,
};
use crate::value::convert::{scalar_to_string, to_int, truthy};
use crate::value::{ArrayKey, ArrayValue, ObjRef, Value};

impl Interpreter<'_> {
    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn eval_expr(&mut self, id: ExprId) -> ExecResult {
        let expr = *self.program().arena.expr(id);
        match expr.kind {
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Bool(b) => Ok(Value::bool(b)),
            ExprKind::Int(i) => Ok(Value::int(i)),
            ExprKind::Float(bits) => Ok(Value::float(f64::from_bits(bits))),
            ExprKind::String(name) => Ok(Value::str(self.interner().lookup(name))),

            // Reading a variable that was never written yields null, so
            // `??`-style probing needs no special case at this level.
            ExprKind::Var(name) => Ok(self.env().get(name).unwrap_or(Value::Null)),
            ExprKind::ConstFetch(name) => self.fetch_constant(name),

            ExprKind::Array(entries) => {
                let mut array = ArrayValue::new();
                for entry in self.program().arena.entries(entries) {
                    let value = self.eval_expr(entry.value)?;
                    match entry.key {
                        Some(key_expr) => {
                            let key_value = self.eval_expr(key_expr)?;
                            let key = ArrayKey::from_value(&key_value).ok_or_else(|| {
                                EvalError::new(
                                    EvalErrorKind::InvalidOperand,
                                    format!("illegal array key type {}", key_value.type_name()),
                                )
                            })?;
                            array.insert(key, value);
                        }
                        None => {
                            array.push(value);
                        }
                    }
                }
                Ok(Value::array(array))
            }
            ExprKind::List(_) => {
                Err(internal("destructuring pattern used outside assignment").into())
            }

            ExprKind::Assign { target, value } => {
                let value = self.eval_expr(value)?;
                self.assign_to(target, value)
            }
            ExprKind::AssignCompound { op, target, value } => {
                self.compound_assign(op, target, value)
            }

            ExprKind::Binary { op, left, right } => self.eval_binary(op, left, right),
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                evaluate_unary(op, &operand).map_err(Signal::from)
            }
            ExprKind::Ternary {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.eval_expr(cond)?;
                if truthy(&cond) {
                    match then_branch {
                        Some(then_branch) => self.eval_expr(then_branch),
                        // Short form `?:` reuses the condition value.
                        None => Ok(cond),
                    }
                } else {
                    self.eval_expr(else_branch)
                }
            }
            ExprKind::Cast { kind, expr } => {
                let value = self.eval_expr(expr)?;
                self.eval_cast(kind, &value)
            }

            ExprKind::Isset(operands) => {
                for &operand in self.program().arena.expr_list(operands) {
                    let set = matches!(self.eval_isset_like(operand)?, Some(v) if !v.is_null());
                    if !set {
                        return Ok(Value::bool(false));
                    }
                }
                Ok(Value::bool(true))
            }
            ExprKind::Empty(operand) => {
                let value = self.eval_isset_like(operand)?;
                Ok(Value::bool(value.as_ref().is_none_or(|v| !truthy(v))))
            }

            ExprKind::Index { base, index } => {
                let Some(index) = index else {
                    return Err(internal("append index `[]` read outside assignment").into());
                };
                let base = self.eval_expr(base)?;
                let index = self.eval_expr(index)?;
                self.read_index(&base, &index)
            }
            ExprKind::Prop { base, name } => {
                let base = self.eval_expr(base)?;
                let obj = self.expect_object(&base)?;
                self.read_property(&obj, name)
            }
            ExprKind::StaticProp { class, name } => {
                let class = self.resolve_class_ref(class)?;
                self.read_static_prop(class, name)
            }
            ExprKind::ClassConst { class, name } => {
                let class = self.resolve_class_ref(class)?;
                self.registry().constant(class, name).ok_or_else(|| {
                    let class_name = self.interner().lookup(self.registry().class_name(class));
                    undefined_constant(&format!("{class_name}::{}", self.interner().lookup(name)))
                        .into()
                })
            }

            ExprKind::Call { callee, args } => self.eval_call(callee, args),
            ExprKind::MethodCall {
                receiver,
                method,
                args,
            } => self.eval_method_call(receiver, method, args),
            ExprKind::StaticCall {
                class,
                method,
                args,
            } => self.eval_static_call(class, method, args),
            ExprKind::New { class, args } => self.eval_new(class, args),
            ExprKind::Clone(operand) => self.eval_clone(operand),
            ExprKind::InstanceOf { expr, class } => self.eval_instanceof(expr, class),
            ExprKind::Closure { func, captures } => self.eval_closure(func, captures),

            ExprKind::Yield { key, value } => self.eval_yield(key, value),
            ExprKind::YieldFrom(expr) => self.eval_yield_from(expr),

            ExprKind::Exit(operand) => {
                let (status, message) = match operand {
                    None => (0, None),
                    Some(expr) => match self.eval_expr(expr)? {
                        Value::Int(status) => (status, None),
                        other => (0, scalar_to_string(&other).map(Into::into)),
                    },
                };
                Err(Signal::Exit { status, message })
            }
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExecResult {
        match op {
            // Short-circuit: the untaken operand is never evaluated.
            BinaryOp::And => {
                let left = self.eval_expr(left)?;
                if !truthy(&left) {
                    return Ok(Value::bool(false));
                }
                let right = self.eval_expr(right)?;
                Ok(Value::bool(truthy(&right)))
            }
            BinaryOp::Or => {
                let left = self.eval_expr(left)?;
                if truthy(&left) {
                    return Ok(Value::bool(true));
                }
                let right = self.eval_expr(right)?;
                Ok(Value::bool(truthy(&right)))
            }
            // `??` probes quietly: an unset variable/index/property on
            // the left is null, not an error.
            BinaryOp::Coalesce => {
                match self.eval_isset_like(left)? {
                    Some(value) if !value.is_null() => Ok(value),
                    _ => self.eval_expr(right),
                }
            }
            BinaryOp::Concat => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                let mut s = self.coerce_string(&left)?;
                s.push_str(&self.coerce_string(&right)?);
                Ok(Value::str(s))
            }
            _ => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                evaluate_binary(op, &left, &right).map_err(Signal::from)
            }
        }
    }

    /// Value-level binary combination for compound assignment, where
    /// both operands are already evaluated.
    pub(crate) fn binary_value(&mut self, op: BinaryOp, left: &Value, right: &Value) -> ExecResult {
        match op {
            BinaryOp::Concat => {
                let mut s = self.coerce_string(left)?;
                s.push_str(&self.coerce_string(right)?);
                Ok(Value::str(s))
            }
            BinaryOp::Coalesce => Ok(if left.is_null() {
                right.clone()
            } else {
                left.clone()
            }),
            _ => evaluate_binary(op, left, right).map_err(Signal::from),
        }
    }

    fn eval_cast(&mut self, kind: CastKind, value: &Value) -> ExecResult {
        match (kind, value) {
            (CastKind::String, Value::Object(_) | Value::Closure(_) | Value::Generator(_)) => {
                Ok(Value::str(self.coerce_string(value)?))
            }
            (CastKind::Array, Value::Object(obj)) => {
                let data = obj.borrow();
                let mut array = ArrayValue::new();
                for (name, prop) in data.props.iter() {
                    let key = self.interner().lookup(*name);
                    array.insert(ArrayKey::from_str_key(&key.into()), prop.clone());
                }
                Ok(Value::array(array))
            }
            _ => Ok(evaluate_cast(kind, value)),
        }
    }

    fn fetch_constant(&mut self, name: Name) -> ExecResult {
        let resolved = self
            .namespace()
            .resolve(UseKind::Constant, name, self.interner());
        for candidate in std::iter::once(resolved.primary).chain(resolved.fallback) {
            if let Some(value) = self.constant(candidate) {
                return Ok(value);
            }
        }
        Err(undefined_constant(self.interner().lookup(name)).into())
    }

    /// Indexed read: arrays by key, strings by character offset, null
    /// quietly yields null.
    pub(crate) fn read_index(&mut self, base: &Value, index: &Value) -> ExecResult {
        match base {
            Value::Array(array) => {
                let Some(key) = ArrayKey::from_value(index) else {
                    return Err(EvalError::new(
                        EvalErrorKind::InvalidOperand,
                        format!("illegal array key type {}", index.type_name()),
                    )
                    .into());
                };
                Ok(array.get(&key).cloned().unwrap_or(Value::Null))
            }
            Value::Str(s) => {
                let offset = to_int(index);
                let ch = usize::try_from(offset).ok().and_then(|i| s.chars().nth(i));
                Ok(ch.map_or(Value::str(""), |c| Value::str(c.to_string())))
            }
            Value::Null => Ok(Value::Null),
            other => Err(EvalError::new(
                EvalErrorKind::InvalidOperand,
                format!("cannot index a value of type {}", other.type_name()),
            )
            .into()),
        }
    }

    pub(crate) fn expect_object(&self, value: &Value) -> Result<ObjRef, Signal> {
        match value {
            Value::Object(obj) => Ok(obj.clone()),
            other => Err(crate::signal::not_an_object(other.type_name()).into()),
        }
    }

    /// Property read: accessible declared/dynamic property first, then
    /// `__get`, then quiet null. A declared-but-inaccessible property
    /// without `__get` is a visibility error.
    pub(crate) fn read_property(&mut self, obj: &ObjRef, name: Name) -> ExecResult {
        let class = obj.borrow().class;
        let declared = self.registry().find_prop(class, name).map(|p| (p.declared_in, p.visibility));
        let accessible = match declared {
            Some((declared_in, visibility)) => {
                self.registry()
                    .can_access(self.current_class(), declared_in, visibility)
            }
            None => true,
        };
        if accessible {
            if let Some(value) = obj.borrow().props.get(name) {
                return Ok(value.clone());
            }
        }
        if let Some(getter) = self.registry().find_method(class, self.names().get) {
            if self.magic_enter(obj, name, MagicKind::Get) {
                let prop_name = Value::str(self.interner().lookup(name));
                let result = self.invoke_method(obj, &getter, vec![prop_name], class);
                self.magic_exit();
                return result;
            }
        }
        if !accessible {
            let class_name = self.interner().lookup(self.registry().class_name(class));
            return Err(visibility_violation(
                "inaccessible",
                class_name,
                self.interner().lookup(name),
            )
            .into());
        }
        Ok(Value::Null)
    }

    pub(crate) fn read_static_prop(&mut self, class: crate::classes::ClassId, name: Name) -> ExecResult {
        let Some(prop) = self.registry().static_prop(class, name) else {
            let class_name = self.interner().lookup(self.registry().class_name(class));
            return Err(crate::signal::undefined_property(
                class_name,
                self.interner().lookup(name),
            )
            .into());
        };
        if !self
            .registry()
            .can_access(self.current_class(), prop.declared_in, prop.visibility)
        {
            let class_name = self.interner().lookup(self.registry().class_name(class));
            return Err(visibility_violation(
                "inaccessible static",
                class_name,
                self.interner().lookup(name),
            )
            .into());
        }
        let value = prop.slot.borrow().clone();
        Ok(value)
    }

    /// Quiet evaluation for `isset`/`empty`/`??`: unset variables,
    /// missing keys, and missing properties are `None` instead of an
    /// error or a null-with-diagnostic.
    pub(crate) fn eval_isset_like(&mut self, id: ExprId) -> Result<Option<Value>, Signal> {
        let expr = *self.program().arena.expr(id);
        match expr.kind {
            ExprKind::Var(name) => Ok(self.env().get(name)),
            ExprKind::Index { base, index } => {
                let Some(index) = index else {
                    return Ok(None);
                };
                let Some(base) = self.eval_isset_like(base)? else {
                    return Ok(None);
                };
                let index = self.eval_expr(index)?;
                match &base {
                    Value::Array(array) => {
                        Ok(ArrayKey::from_value(&index).and_then(|k| array.get(&k).cloned()))
                    }
                    Value::Str(s) => {
                        let offset = to_int(&index);
                        Ok(usize::try_from(offset)
                            .ok()
                            .and_then(|i| s.chars().nth(i))
                            .map(|c| Value::str(c.to_string())))
                    }
                    _ => Ok(None),
                }
            }
            ExprKind::Prop { base, name } => {
                let Some(base) = self.eval_isset_like(base)? else {
                    return Ok(None);
                };
                let Value::Object(obj) = base else {
                    return Ok(None);
                };
                self.prop_isset_like(&obj, name)
            }
            ExprKind::StaticProp { class, name } => {
                let Ok(class) = self.resolve_class_ref(class) else {
                    return Ok(None);
                };
                Ok(self
                    .registry()
                    .static_prop(class, name)
                    .map(|p| p.slot.borrow().clone()))
            }
            _ => self.eval_expr(id).map(Some),
        }
    }

    /// Quiet property probe: direct value if present and accessible,
    /// otherwise gated on `__isset` before falling back to `__get`.
    fn prop_isset_like(&mut self, obj: &ObjRef, name: Name) -> Result<Option<Value>, Signal> {
        let class = obj.borrow().class;
        let declared = self.registry().find_prop(class, name).map(|p| (p.declared_in, p.visibility));
        let accessible = match declared {
            Some((declared_in, visibility)) => {
                self.registry()
                    .can_access(self.current_class(), declared_in, visibility)
            }
            None => true,
        };
        if accessible {
            if let Some(value) = obj.borrow().props.get(name) {
                return Ok(Some(value.clone()));
            }
        }
        let prop_name = Value::str(self.interner().lookup(name));
        if let Some(isset_hook) = self.registry().find_method(class, self.names().isset) {
            if self.magic_enter(obj, name, MagicKind::Isset) {
                let is_set = self.invoke_method(obj, &isset_hook, vec![prop_name.clone()], class);
                self.magic_exit();
                if !truthy(&is_set?) {
                    return Ok(None);
                }
            }
        }
        if let Some(getter) = self.registry().find_method(class, self.names().get) {
            if self.magic_enter(obj, name, MagicKind::Get) {
                let result = self.invoke_method(obj, &getter, vec![prop_name], class);
                self.magic_exit();
                return result.map(Some);
            }
        }
        Ok(None)
    }

    /// Coerce to string, dispatching `__toString` for objects.
    pub(crate) fn coerce_string(&mut self, value: &Value) -> Result<String, Signal> {
        if let Some(s) = scalar_to_string(value) {
            return Ok(s);
        }
        if let Value::Object(obj) = value {
            let class = obj.borrow().class;
            if let Some(method) = self.registry().find_method(class, self.names().to_string) {
                let result = self.invoke_method(obj, &method, Vec::new(), class)?;
                if let Value::Str(s) = result {
                    return Ok(s.to_string());
                }
                return Err(EvalError::new(
                    EvalErrorKind::TypeMismatch,
                    "__toString() must return a string",
                )
                .into());
            }
        }
        Err(EvalError::new(
            EvalErrorKind::TypeMismatch,
            format!(
                "value of type {} could not be converted to string",
                value.type_name()
            ),
        )
        .into())
    }

    fn eval_yield(&mut self, key: Option<ExprId>, value: Option<ExprId>) -> ExecResult {
        let key = match key {
            Some(expr) => {
                let key_value = self.eval_expr(expr)?;
                Some(ArrayKey::from_value(&key_value).ok_or_else(|| {
                    Signal::from(EvalError::new(
                        EvalErrorKind::InvalidOperand,
                        format!("illegal yield key type {}", key_value.type_name()),
                    ))
                })?)
            }
            None => None,
        };
        let value = match value {
            Some(expr) => self.eval_expr(expr)?,
            None => Value::Null,
        };
        let Some(collector) = self.collector_mut() else {
            return Err(internal("yield outside of a generator body").into());
        };
        match key {
            Some(key) => collector.push_keyed(key, value),
            None => collector.push_auto(value),
        }
        // `yield` as an expression evaluates to null (no send protocol).
        Ok(Value::Null)
    }

    fn eval_yield_from(&mut self, expr: ExprId) -> ExecResult {
        let source = self.eval_expr(expr)?;
        let entries: Vec<(ArrayKey, Value)> = match &source {
            Value::Array(array) => array.entries().to_vec(),
            Value::Generator(generator) => generator.entries.clone(),
            other => return Err(not_iterable(other.type_name()).into()),
        };
        let Some(collector) = self.collector_mut() else {
            return Err(internal("yield from outside of a generator body").into());
        };
        // Auto (int) keys are re-keyed into the outer sequence; string
        // keys carry over verbatim.
        for (key, value) in entries {
            match key {
                ArrayKey::Int(_) => collector.push_auto(value),
                ArrayKey::Str(_) => collector.push_keyed(key, value),
            }
        }
        Ok(Value::Null)
    }
}
