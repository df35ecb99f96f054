//! The generic assign-to-lvalue operation.
//!
//! One entry point, four target shapes: variable, array element
//! (indexed or append, auto-vivifying intermediate arrays), object or
//! static property, and destructuring patterns. Compound assignments
//! read, combine, and re-enter the same path; `??=` skips both the
//! right-hand side and the write when the current value is non-null.
//!
//! Arrays have value semantics, so element assignment is read-modify-
//! write: the base is read (or created), the copy is modified, and the
//! copy is written back through this same dispatch — which is what makes
//! nested writes like `$a[1][2] = $v` compose for free.

use quill_ir::{AssignOp, ExprId, ExprKind, ListItemRange, Name};

use crate::classes::ClassId;
use crate::interp::{Interpreter, MagicKind};
use crate::signal::{
    internal, undefined_property, visibility_violation, EvalError, EvalErrorKind, ExecResult,
    Signal,
};
use crate::value::{ArrayKey, ArrayValue, ObjRef, Value};

impl Interpreter<'_> {
    /// Assign `value` to the lvalue denoted by `target`, returning the
    /// assigned value (assignment is an expression).
    pub(crate) fn assign_to(&mut self, target: ExprId, value: Value) -> ExecResult {
        let expr = *self.program().arena.expr(target);
        match expr.kind {
            ExprKind::Var(name) => {
                self.env_mut().set(name, value.clone());
                Ok(value)
            }
            ExprKind::Index { base, index } => {
                let mut array = self.base_array_for_write(base)?;
                match index {
                    Some(index) => {
                        let index = self.eval_expr(index)?;
                        let key = array_key(&index)?;
                        array.insert(key, value.clone());
                    }
                    None => {
                        array.push(value.clone());
                    }
                }
                self.assign_to(base, Value::array(array))?;
                Ok(value)
            }
            ExprKind::Prop { base, name } => {
                let base = self.eval_expr(base)?;
                let obj = self.expect_object(&base)?;
                self.write_property(&obj, name, value.clone())?;
                Ok(value)
            }
            ExprKind::StaticProp { class, name } => {
                let class = self.resolve_class_ref(class)?;
                self.write_static_prop(class, name, value.clone())?;
                Ok(value)
            }
            ExprKind::List(items) => {
                self.destructure(items, &value)?;
                Ok(value)
            }
            _ => Err(EvalError::new(
                EvalErrorKind::InvalidOperand,
                "invalid assignment target",
            )
            .into()),
        }
    }

    /// Compound assignment: read the current value, combine, delegate to
    /// the ordinary assignment path.
    pub(crate) fn compound_assign(
        &mut self,
        op: AssignOp,
        target: ExprId,
        value_expr: ExprId,
    ) -> ExecResult {
        if matches!(op, AssignOp::Coalesce) {
            // `??=`: when the target is set and non-null, neither the
            // right-hand side nor the write happens.
            if let Some(current) = self.eval_isset_like(target)? {
                if !current.is_null() {
                    return Ok(current);
                }
            }
            let value = self.eval_expr(value_expr)?;
            return self.assign_to(target, value);
        }
        let current = self.eval_expr(target)?;
        let rhs = self.eval_expr(value_expr)?;
        let combined = self.binary_value(op.binary_op(), &current, &rhs)?;
        self.assign_to(target, combined)
    }

    /// The base value of an indexed write, as an array copy to modify.
    /// A missing or null base auto-vivifies to an empty array.
    fn base_array_for_write(&mut self, base: ExprId) -> Result<ArrayValue, Signal> {
        match self.eval_isset_like(base)? {
            None | Some(Value::Null) => Ok(ArrayValue::new()),
            Some(Value::Array(array)) => Ok(array),
            Some(other) => Err(EvalError::new(
                EvalErrorKind::InvalidOperand,
                format!("cannot use a value of type {} as an array", other.type_name()),
            )
            .into()),
        }
    }

    /// Property write: accessible declared property, then existing
    /// dynamic property, then `__set`, then dynamic creation.
    pub(crate) fn write_property(
        &mut self,
        obj: &ObjRef,
        name: Name,
        value: Value,
    ) -> Result<(), Signal> {
        let class = obj.borrow().class;
        let declared = self
            .registry()
            .find_prop(class, name)
            .map(|p| (p.declared_in, p.visibility));
        match declared {
            Some((declared_in, visibility)) => {
                if self
                    .registry()
                    .can_access(self.current_class(), declared_in, visibility)
                {
                    obj.borrow_mut().props.set(name, value);
                    return Ok(());
                }
            }
            None => {
                if obj.borrow().props.contains(name) {
                    obj.borrow_mut().props.set(name, value);
                    return Ok(());
                }
            }
        }
        if let Some(setter) = self.registry().find_method(class, self.names().set) {
            if self.magic_enter(obj, name, MagicKind::Set) {
                let prop_name = Value::str(self.interner().lookup(name));
                let result = self.invoke_method(obj, &setter, vec![prop_name, value], class);
                self.magic_exit();
                result?;
                return Ok(());
            }
        }
        if declared.is_some() {
            let class_name = self.interner().lookup(self.registry().class_name(class));
            return Err(visibility_violation(
                "inaccessible",
                class_name,
                self.interner().lookup(name),
            )
            .into());
        }
        obj.borrow_mut().props.set(name, value);
        Ok(())
    }

    fn write_static_prop(
        &mut self,
        class: ClassId,
        name: Name,
        value: Value,
    ) -> Result<(), Signal> {
        let Some(prop) = self.registry().static_prop(class, name) else {
            let class_name = self.interner().lookup(self.registry().class_name(class));
            return Err(undefined_property(class_name, self.interner().lookup(name)).into());
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
        *prop.slot.borrow_mut() = value;
        Ok(())
    }

    /// Destructuring assignment: items bind positionally through an
    /// auto-incrementing int key, or by explicit key. Holes consume a
    /// position without binding; nested patterns recurse through
    /// `assign_to`.
    fn destructure(&mut self, items: ListItemRange, value: &Value) -> Result<(), Signal> {
        let Value::Array(array) = value else {
            return Err(EvalError::new(
                EvalErrorKind::InvalidOperand,
                format!("cannot destructure a value of type {}", value.type_name()),
            )
            .into());
        };
        let array = array.clone();
        let mut auto = 0i64;
        for item in self.program().arena.list_items(items) {
            let key = match item.key {
                Some(key_expr) => {
                    let key_value = self.eval_expr(key_expr)?;
                    array_key(&key_value)?
                }
                None => {
                    let key = ArrayKey::Int(auto);
                    auto = auto.saturating_add(1);
                    key
                }
            };
            let Some(target) = item.target else {
                continue;
            };
            let element = array.get(&key).cloned().unwrap_or(Value::Null);
            self.assign_to(target, element)?;
        }
        Ok(())
    }

    /// `unset(...)` over one target. Unsetting something that does not
    /// exist is a quiet no-op.
    pub(crate) fn unset_target(&mut self, target: ExprId) -> Result<(), Signal> {
        let expr = *self.program().arena.expr(target);
        match expr.kind {
            ExprKind::Var(name) => {
                self.env_mut().unset(name);
                Ok(())
            }
            ExprKind::Index { base, index } => {
                let Some(index) = index else {
                    return Err(internal("cannot unset an append position").into());
                };
                match self.eval_isset_like(base)? {
                    Some(Value::Array(mut array)) => {
                        let index = self.eval_expr(index)?;
                        let key = array_key(&index)?;
                        array.remove(&key);
                        self.assign_to(base, Value::array(array))?;
                        Ok(())
                    }
                    _ => Ok(()),
                }
            }
            ExprKind::Prop { base, name } => {
                let base = self.eval_expr(base)?;
                let obj = self.expect_object(&base)?;
                self.unset_property(&obj, name)
            }
            _ => Err(EvalError::new(
                EvalErrorKind::InvalidOperand,
                "invalid unset target",
            )
            .into()),
        }
    }

    /// Property unset: remove an accessible property, else `__unset`.
    fn unset_property(&mut self, obj: &ObjRef, name: Name) -> Result<(), Signal> {
        let class = obj.borrow().class;
        let declared = self
            .registry()
            .find_prop(class, name)
            .map(|p| (p.declared_in, p.visibility));
        let accessible = match declared {
            Some((declared_in, visibility)) => {
                self.registry()
                    .can_access(self.current_class(), declared_in, visibility)
            }
            None => true,
        };
        if accessible && obj.borrow().props.contains(name) {
            obj.borrow_mut().props.remove(name);
            return Ok(());
        }
        if let Some(unset_hook) = self.registry().find_method(class, self.names().unset) {
            if self.magic_enter(obj, name, MagicKind::Unset) {
                let prop_name = Value::str(self.interner().lookup(name));
                let result = self.invoke_method(obj, &unset_hook, vec![prop_name], class);
                self.magic_exit();
                result?;
            }
        }
        Ok(())
    }
}

fn array_key(value: &Value) -> Result<ArrayKey, Signal> {
    ArrayKey::from_value(value).ok_or_else(|| {
        Signal::from(EvalError::new(
            EvalErrorKind::InvalidOperand,
            format!("illegal array key type {}", value.type_name()),
        ))
    })
}
