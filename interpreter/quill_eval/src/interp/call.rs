//! Call dispatch: free functions, closures, methods, construction, and
//! the generator runner.
//!
//! Free-call resolution priority: a callee expression yielding a closure
//! or invokable object, then the builtin table, then the namespaced user
//! function, then the global user function. Method resolution goes
//! through the receiver class's resolved table with `__call` as the
//! fallback, and visibility is enforced against the caller's lexical
//! class before the body runs.

use std::rc::Rc;

use quill_ir::{ArgRange, Callee, CaptureRange, ClassRef, ExprId, ExprKind, FuncId, Name, UseKind, Visibility};

use crate::binder::{bind_arguments, BindContext, CallArg};
use crate::builtins::BuiltinDef;
use crate::classes::{ClassId, FunctionInfo, MethodBody, MethodDef};
use crate::environment::{new_slot, Environment, Slot};
use crate::interp::{Frame, Interpreter, SeqCollector};
use crate::signal::{
    internal, not_an_object, not_callable, not_iterable, undefined_class, undefined_function,
    undefined_method, visibility_violation, EvalError, EvalErrorKind, ExecResult, Signal,
};
use crate::value::{ArrayKey, ArrayValue, ClosureValue, GeneratorValue, ObjRef, ObjectData, Value};

/// Context a call frame starts with.
#[derive(Default)]
pub(crate) struct FrameCtx {
    pub this: Option<ObjRef>,
    pub class: Option<ClassId>,
    pub static_class: Option<ClassId>,
    pub captures: Vec<(Name, Slot)>,
}

impl Interpreter<'_> {
    /// Evaluate a call-site argument list, expanding spreads: int keys
    /// become positional arguments, string keys named ones.
    pub(crate) fn eval_args(&mut self, args: ArgRange) -> Result<Vec<CallArg>, Signal> {
        let nodes = self.program().arena.args(args);
        let mut out = Vec::with_capacity(nodes.len());
        for arg in nodes {
            if arg.spread {
                let spread = self.eval_expr(arg.value)?;
                let entries: Vec<(ArrayKey, Value)> = match &spread {
                    Value::Array(array) => array.entries().to_vec(),
                    Value::Generator(generator) => generator.entries.clone(),
                    other => return Err(not_iterable(other.type_name()).into()),
                };
                for (key, value) in entries {
                    match key {
                        ArrayKey::Int(_) => out.push(CallArg::positional(value)),
                        ArrayKey::Str(s) => {
                            out.push(CallArg::named(self.interner().intern(&s), value));
                        }
                    }
                }
            } else {
                let value = self.eval_expr(arg.value)?;
                match arg.name {
                    Some(name) => out.push(CallArg::named(name, value)),
                    None => out.push(CallArg::positional(value)),
                }
            }
        }
        Ok(out)
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn eval_call(&mut self, callee: Callee, args: ArgRange) -> ExecResult {
        match callee {
            Callee::Expr(expr) => {
                let callee = self.eval_expr(expr)?;
                let args = self.eval_args(args)?;
                self.call_value_with_args(&callee, args)
            }
            Callee::Name(name) => {
                // Builtins shadow user functions and resolve on the
                // bare name, so they stay reachable from any namespace.
                if let Some(def) = self.builtins().get(name) {
                    return self.call_builtin(def, args);
                }
                let resolved = self
                    .namespace()
                    .resolve(UseKind::Function, name, self.interner());
                for candidate in std::iter::once(resolved.primary).chain(resolved.fallback) {
                    if let Some(info) = self.user_function(candidate) {
                        let args = self.eval_args(args)?;
                        return self.call_user_function(&info, args, FrameCtx::default());
                    }
                }
                Err(undefined_function(self.interner().lookup(name)).into())
            }
        }
    }

    /// Builtins take their arguments positionally. A `writes_back_first`
    /// builtin's (possibly mutated) first argument is assigned back
    /// through the original lvalue, giving the cursor and sort functions
    /// their by-reference semantics.
    fn call_builtin(&mut self, def: &'static BuiltinDef, args: ArgRange) -> ExecResult {
        let nodes = self.program().arena.args(args);
        let write_back_target = nodes
            .first()
            .filter(|a| a.name.is_none() && !a.spread)
            .map(|a| a.value)
            .filter(|&e| is_lvalue(self.program().arena.expr(e).kind));
        let mut values: Vec<Value> = self
            .eval_args(args)?
            .into_iter()
            .map(|a| a.value)
            .collect();
        let result = (def.run)(self, &mut values)?;
        if def.writes_back_first {
            if let (Some(target), Some(first)) = (write_back_target, values.first()) {
                self.assign_to(target, first.clone())?;
            }
        }
        Ok(result)
    }

    /// Call a user function: bind, frame, run (or collect, for a
    /// generator body).
    pub(crate) fn call_user_function(
        &mut self,
        info: &Rc<FunctionInfo>,
        args: Vec<CallArg>,
        ctx: FrameCtx,
    ) -> ExecResult {
        let cx = BindContext {
            interner: self.interner(),
            registry: self.registry(),
            strict_types: self.program().strict_types,
        };
        let bound = bind_arguments(&cx, &info.params, &info.defaults, args)?;
        self.run_function_frame(info, bound, ctx)
    }

    fn run_function_frame(
        &mut self,
        info: &Rc<FunctionInfo>,
        bound: Vec<Value>,
        ctx: FrameCtx,
    ) -> ExecResult {
        let mut env = Environment::new();
        for (param, value) in info.params.iter().zip(bound) {
            env.set(param.name, value);
        }
        for (name, slot) in ctx.captures {
            env.link(name, slot);
        }
        if let Some(this) = &ctx.this {
            env.set(self.names().this, Value::Object(this.clone()));
        }
        self.push_frame(Frame {
            env,
            this: ctx.this,
            class: ctx.class,
            static_class: ctx.static_class,
        })?;

        if info.is_generator {
            // Generator call: execute the body eagerly to completion,
            // collecting every yielded pair; the return value (if any)
            // is discarded.
            self.push_collector();
            let raw = self.exec_block(info.body);
            let collector = self.pop_collector();
            self.pop_frame();
            match raw {
                Ok(_) | Err(Signal::Return(_)) => {
                    let entries = collector.map(SeqCollector::into_entries).unwrap_or_default();
                    Ok(Value::generator(GeneratorValue::new(entries)))
                }
                Err(Signal::Break(_) | Signal::Continue(_)) => {
                    Err(internal("break/continue crossed a function boundary").into())
                }
                Err(other) => Err(other),
            }
        } else {
            let raw = self.exec_block(info.body);
            self.pop_frame();
            match raw {
                Ok(_) => Ok(Value::Null),
                Err(Signal::Return(value)) => Ok(value),
                Err(Signal::Break(_) | Signal::Continue(_)) => {
                    Err(internal("break/continue crossed a function boundary").into())
                }
                Err(other) => Err(other),
            }
        }
    }

    fn call_closure(&mut self, closure: &ClosureValue, args: Vec<CallArg>) -> ExecResult {
        let static_class = closure
            .this
            .as_ref()
            .map(|t| t.borrow().class)
            .or(closure.scope);
        let ctx = FrameCtx {
            this: closure.this.clone(),
            class: closure.scope,
            static_class,
            captures: closure.captures.clone(),
        };
        let func = Rc::clone(&closure.func);
        self.call_user_function(&func, args, ctx)
    }

    /// Call an arbitrary value with positional arguments (builtin
    /// callbacks, `__invoke` plumbing).
    pub(crate) fn call_value(&mut self, callee: &Value, values: Vec<Value>) -> ExecResult {
        let args = values.into_iter().map(CallArg::positional).collect();
        self.call_value_with_args(callee, args)
    }

    fn call_value_with_args(&mut self, callee: &Value, args: Vec<CallArg>) -> ExecResult {
        match callee {
            Value::Closure(closure) => {
                let closure = Rc::clone(closure);
                self.call_closure(&closure, args)
            }
            // A string names a function.
            Value::Str(s) => {
                let name = self.interner().intern(s);
                if let Some(def) = self.builtins().get(name) {
                    let mut values: Vec<Value> = args.into_iter().map(|a| a.value).collect();
                    return (def.run)(self, &mut values);
                }
                let resolved = self
                    .namespace()
                    .resolve(UseKind::Function, name, self.interner());
                for candidate in std::iter::once(resolved.primary).chain(resolved.fallback) {
                    if let Some(info) = self.user_function(candidate) {
                        return self.call_user_function(&info, args, FrameCtx::default());
                    }
                }
                Err(undefined_function(s).into())
            }
            Value::Object(obj) => {
                let class = obj.borrow().class;
                match self.registry().find_method(class, self.names().invoke) {
                    Some(method) => {
                        let obj = obj.clone();
                        let values = args.into_iter().map(|a| a.value).collect();
                        self.invoke_method(&obj, &method, values, class)
                    }
                    None => Err(not_callable("object").into()),
                }
            }
            other => Err(not_callable(other.type_name()).into()),
        }
    }

    /// Run a resolved method with positional values, bypassing
    /// visibility (used by magic-method dispatch and internal calls).
    pub(crate) fn invoke_method(
        &mut self,
        obj: &ObjRef,
        method: &Rc<MethodDef>,
        values: Vec<Value>,
        static_class: ClassId,
    ) -> ExecResult {
        match &method.body {
            MethodBody::Native(native) => native(self, obj, &values),
            MethodBody::User(info) => {
                let info = Rc::clone(info);
                let args = values.into_iter().map(CallArg::positional).collect();
                let ctx = FrameCtx {
                    this: (!method.is_static()).then(|| obj.clone()),
                    class: Some(method.declared_in),
                    static_class: Some(static_class),
                    captures: Vec::new(),
                };
                self.call_user_function(&info, args, ctx)
            }
        }
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn eval_method_call(
        &mut self,
        receiver: ExprId,
        method: Name,
        args: ArgRange,
    ) -> ExecResult {
        let receiver = self.eval_expr(receiver)?;
        let obj = match &receiver {
            Value::Object(obj) => obj.clone(),
            other => return Err(not_an_object(other.type_name()).into()),
        };
        let class = obj.borrow().class;

        if let Some(found) = self.registry().find_method(class, method) {
            self.check_method_access(&found, class, method)?;
            let args = self.eval_args(args)?;
            return match &found.body {
                MethodBody::Native(native) => {
                    let values: Vec<Value> = args.into_iter().map(|a| a.value).collect();
                    native(self, &obj, &values)
                }
                MethodBody::User(info) => {
                    let info = Rc::clone(info);
                    let ctx = FrameCtx {
                        this: (!found.is_static()).then(|| obj.clone()),
                        class: Some(found.declared_in),
                        // Late static binding anchors at the receiver's
                        // actual class, not the declaring one.
                        static_class: Some(class),
                        captures: Vec::new(),
                    };
                    self.call_user_function(&info, args, ctx)
                }
            };
        }

        // `__call` absorbs calls to undefined methods.
        if let Some(fallback) = self.registry().find_method(class, self.names().call) {
            let values: Vec<Value> = self.eval_args(args)?.into_iter().map(|a| a.value).collect();
            let packed = Value::array(ArrayValue::from_values(values));
            let method_name = Value::str(self.interner().lookup(method));
            return self.invoke_method(&obj, &fallback, vec![method_name, packed], class);
        }

        let class_name = self.interner().lookup(self.registry().class_name(class));
        Err(undefined_method(class_name, self.interner().lookup(method)).into())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn eval_static_call(
        &mut self,
        class: ClassRef,
        method: Name,
        args: ArgRange,
    ) -> ExecResult {
        let target = self.resolve_class_ref(class)?;
        let Some(found) = self.registry().find_method(target, method) else {
            let class_name = self.interner().lookup(self.registry().class_name(target));
            return Err(undefined_method(class_name, self.interner().lookup(method)).into());
        };
        self.check_method_access(&found, target, method)?;
        let args = self.eval_args(args)?;

        // `static::` resolves to the named class for explicit-class
        // calls, and forwards the current binding for the keyword forms.
        let forwarding = matches!(class, ClassRef::SelfRef | ClassRef::Parent | ClassRef::Static);
        let static_class = if forwarding {
            self.current_static_class().unwrap_or(target)
        } else {
            target
        };

        let this = if found.is_static() {
            None
        } else {
            // An instance method dispatched through `parent::`/`self::`
            // (or an explicit compatible class) keeps the current $this.
            let candidate = self.current_this();
            let compatible = candidate.as_ref().is_some_and(|this| {
                self.registry()
                    .is_subclass_or_self(this.borrow().class, target)
            });
            if !compatible {
                let class_name = self.interner().lookup(self.registry().class_name(target));
                return Err(EvalError::new(
                    EvalErrorKind::NotCallable,
                    format!(
                        "non-static method {class_name}::{}() cannot be called statically",
                        self.interner().lookup(method)
                    ),
                )
                .into());
            }
            candidate
        };

        match &found.body {
            MethodBody::Native(native) => {
                let values: Vec<Value> = args.into_iter().map(|a| a.value).collect();
                let Some(this) = this else {
                    return Err(internal("native methods require an instance").into());
                };
                native(self, &this, &values)
            }
            MethodBody::User(info) => {
                let info = Rc::clone(info);
                let ctx = FrameCtx {
                    this,
                    class: Some(found.declared_in),
                    static_class: Some(static_class),
                    captures: Vec::new(),
                };
                self.call_user_function(&info, args, ctx)
            }
        }
    }

    fn check_method_access(
        &self,
        method: &Rc<MethodDef>,
        class: ClassId,
        name: Name,
    ) -> Result<(), Signal> {
        if self
            .registry()
            .can_access(self.current_class(), method.declared_in, method.visibility)
        {
            return Ok(());
        }
        let vis = match method.visibility {
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        };
        let class_name = self.interner().lookup(self.registry().class_name(class));
        Err(visibility_violation(vis, class_name, self.interner().lookup(name)).into())
    }

    /// Resolve a class reference at a use site.
    pub(crate) fn resolve_class_ref(&mut self, class: ClassRef) -> Result<ClassId, Signal> {
        match class {
            ClassRef::Named(name) => self.resolve_class_name(name),
            ClassRef::SelfRef => self.current_class().ok_or_else(|| {
                Signal::from(undefined_class("self (used outside of a class)"))
            }),
            ClassRef::Parent => {
                let current = self.current_class().ok_or_else(|| {
                    Signal::from(undefined_class("parent (used outside of a class)"))
                })?;
                self.registry().class(current).parent.ok_or_else(|| {
                    Signal::from(undefined_class("parent (class has no parent)"))
                })
            }
            ClassRef::Static => self
                .current_static_class()
                .or_else(|| self.current_class())
                .ok_or_else(|| {
                    Signal::from(undefined_class("static (used outside of a class)"))
                }),
            ClassRef::Expr(expr) => {
                let value = self.eval_expr(expr)?;
                match &value {
                    Value::Str(s) => {
                        let name = self.interner().intern(s);
                        self.resolve_class_name(name)
                    }
                    Value::Object(obj) => Ok(obj.borrow().class),
                    other => Err(EvalError::new(
                        EvalErrorKind::UndefinedClass,
                        format!("cannot use a value of type {} as a class name", other.type_name()),
                    )
                    .into()),
                }
            }
        }
    }

    fn resolve_class_name(&mut self, name: Name) -> Result<ClassId, Signal> {
        let resolved = self
            .namespace()
            .resolve(UseKind::Type, name, self.interner());
        for candidate in std::iter::once(resolved.primary).chain(resolved.fallback) {
            if let Some(id) = self.registry().class_id(candidate) {
                return Ok(id);
            }
        }
        Err(undefined_class(self.interner().lookup(name)).into())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub(crate) fn eval_new(&mut self, class: ClassRef, args: ArgRange) -> ExecResult {
        let class = self.resolve_class_ref(class)?;
        let args = self.eval_args(args)?;
        self.instantiate(class, args)
    }

    /// Construct an instance: property defaults, promoted constructor
    /// parameters, then the constructor body with `$this` bound.
    pub(crate) fn instantiate(&mut self, class: ClassId, args: Vec<CallArg>) -> ExecResult {
        let def = self.registry().class(class);
        if def.is_abstract {
            let class_name = self.interner().lookup(def.name);
            return Err(EvalError::new(
                EvalErrorKind::InvalidDeclaration,
                format!("cannot instantiate abstract class {class_name}"),
            )
            .into());
        }
        let mut data = ObjectData::new(class);
        for prop in &def.props {
            data.props.set(prop.name, prop.default.clone());
        }
        let obj = data.into_ref();

        if let Some(ctor) = self.registry().find_method(class, self.names().construct) {
            self.check_method_access(&ctor, class, self.names().construct)?;
            match &ctor.body {
                MethodBody::Native(native) => {
                    let values: Vec<Value> = args.into_iter().map(|a| a.value).collect();
                    native(self, &obj, &values)?;
                }
                MethodBody::User(info) => {
                    let info = Rc::clone(info);
                    let cx = BindContext {
                        interner: self.interner(),
                        registry: self.registry(),
                        strict_types: self.program().strict_types,
                    };
                    let bound = bind_arguments(&cx, &info.params, &info.defaults, args)?;
                    // Promoted parameters become properties before the
                    // body observes the object.
                    for (param, value) in info.params.iter().zip(&bound) {
                        if param.promote.is_some() {
                            obj.borrow_mut().props.set(param.name, value.clone());
                        }
                    }
                    let ctx = FrameCtx {
                        this: Some(obj.clone()),
                        class: Some(ctor.declared_in),
                        static_class: Some(class),
                        captures: Vec::new(),
                    };
                    self.run_function_frame(&info, bound, ctx)?;
                }
            }
        }
        Ok(Value::Object(obj))
    }

    pub(crate) fn eval_clone(&mut self, operand: ExprId) -> ExecResult {
        let value = self.eval_expr(operand)?;
        let obj = self.expect_object(&value)?;
        // Shallow copy: array properties copy by value, object
        // properties keep aliasing the same instances.
        let copy = obj.borrow().clone().into_ref();
        let class = copy.borrow().class;
        if let Some(hook) = self.registry().find_method(class, self.names().clone) {
            self.invoke_method(&copy, &hook, Vec::new(), class)?;
        }
        Ok(Value::Object(copy))
    }

    pub(crate) fn eval_instanceof(&mut self, expr: ExprId, class: ClassRef) -> ExecResult {
        let value = self.eval_expr(expr)?;
        let Value::Object(obj) = &value else {
            return Ok(Value::bool(false));
        };
        let actual = obj.borrow().class;
        // An unknown right-hand name is false, not an error.
        if let ClassRef::Named(name) = class {
            let resolved = self
                .namespace()
                .resolve(UseKind::Type, name, self.interner());
            for candidate in std::iter::once(resolved.primary).chain(resolved.fallback) {
                if let Some(target) = self.registry().class_id(candidate) {
                    return Ok(Value::bool(self.registry().is_subclass_or_self(actual, target)));
                }
                if let Some(iface) = self.registry().interface_id(candidate) {
                    return Ok(Value::bool(self.registry().implements(actual, iface)));
                }
            }
            return Ok(Value::bool(false));
        }
        match self.resolve_class_ref(class) {
            Ok(target) => Ok(Value::bool(self.registry().is_subclass_or_self(actual, target))),
            Err(_) => Ok(Value::bool(false)),
        }
    }

    /// Closure literal: snapshot captures and the creation context.
    pub(crate) fn eval_closure(&mut self, func: FuncId, captures: CaptureRange) -> ExecResult {
        let decl = self.program().arena.func(func);
        let defaults = self.eval_param_defaults(&decl.params)?;
        let info = Rc::new(FunctionInfo {
            name: Name::EMPTY,
            params: decl.params.clone(),
            defaults,
            body: decl.body,
            is_generator: decl.is_generator,
        });
        let mut captured = Vec::with_capacity(self.program().arena.captures(captures).len());
        for capture in self.program().arena.captures(captures) {
            let slot = if capture.by_ref {
                // Alias the defining scope's slot.
                self.env_mut().slot(capture.name)
            } else {
                // Copy the value as of creation time.
                new_slot(self.env().get(capture.name).unwrap_or(Value::Null))
            };
            captured.push((capture.name, slot));
        }
        Ok(Value::closure(ClosureValue {
            func: info,
            captures: captured,
            this: self.current_this(),
            scope: self.current_class(),
        }))
    }
}

/// Expression shapes a builtin's by-reference first argument can write
/// back through.
fn is_lvalue(kind: ExprKind) -> bool {
    matches!(
        kind,
        ExprKind::Var(_)
            | ExprKind::Index { .. }
            | ExprKind::Prop { .. }
            | ExprKind::StaticProp { .. }
    )
}
