//! Bootstrapped core types: `Throwable`, `Exception`, `RuntimeException`.
//!
//! `throw new Exception("...")` must work without any user declarations,
//! so a minimal exception hierarchy is registered natively when an
//! interpreter is created. `Exception` carries `message` and `code`
//! properties set by a native constructor and read through
//! `getMessage()`/`getCode()`; `RuntimeException` extends it through the
//! ordinary declaration path, so it exercises the same inheritance
//! machinery user classes do.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use quill_ir::{StringInterner, Visibility};

use crate::classes::{
    ClassDef, ClassId, ClassInput, ClassRegistry, InterfaceId, MemberFlags, MethodBody, MethodDef,
    PropEntry,
};
use crate::interp::Interpreter;
use crate::signal::{internal, ExecResult};
use crate::value::{ObjRef, Value};

/// Ids of the bootstrapped core types.
#[derive(Clone, Copy, Debug)]
pub struct CoreClasses {
    pub throwable: InterfaceId,
    pub exception: ClassId,
    pub runtime_exception: ClassId,
}

/// Register the core hierarchy into a fresh registry.
pub fn bootstrap(registry: &mut ClassRegistry, interner: &StringInterner) -> CoreClasses {
    let throwable_name = interner.intern("Throwable");
    let get_message = interner.intern("getMessage");
    let get_code = interner.intern("getCode");
    let construct = interner.intern("__construct");
    let message = interner.intern("message");
    let code = interner.intern("code");

    let throwable = registry
        .declare_interface(
            interner,
            throwable_name,
            Vec::new(),
            vec![get_message, get_code],
            Vec::new(),
        )
        .unwrap_or_else(|_| unreachable!("fresh registry cannot hold Throwable yet"));

    let exception_id = registry.next_class_id();
    let native = |name, func| {
        (
            name,
            Rc::new(MethodDef {
                name,
                body: MethodBody::Native(func),
                visibility: Visibility::Public,
                flags: MemberFlags::empty(),
                declared_in: exception_id,
            }),
        )
    };
    let methods: FxHashMap<_, _> = [
        native(construct, exception_construct as crate::classes::NativeFn),
        native(get_message, exception_get_message),
        native(get_code, exception_get_code),
    ]
    .into_iter()
    .collect();
    let props = vec![
        PropEntry {
            name: message,
            visibility: Visibility::Protected,
            default: Value::str(""),
            declared_in: exception_id,
        },
        PropEntry {
            name: code,
            visibility: Visibility::Protected,
            default: Value::int(0),
            declared_in: exception_id,
        },
    ];
    let exception = registry.register_native_class(ClassDef {
        name: interner.intern("Exception"),
        parent: None,
        interfaces: vec![throwable],
        is_abstract: false,
        is_final: false,
        methods,
        props,
        consts: FxHashMap::default(),
        statics: FxHashMap::default(),
    });

    let runtime_exception = registry
        .declare_class(
            interner,
            ClassInput {
                name: interner.intern("RuntimeException"),
                parent: Some(exception),
                interfaces: Vec::new(),
                traits: Vec::new(),
                consts: Vec::new(),
                props: Vec::new(),
                methods: Vec::new(),
                is_abstract: false,
                is_final: false,
            },
        )
        .unwrap_or_else(|_| unreachable!("fresh registry cannot hold RuntimeException yet"));

    CoreClasses {
        throwable,
        exception,
        runtime_exception,
    }
}

fn exception_construct(
    interp: &mut Interpreter<'_>,
    this: &ObjRef,
    args: &[Value],
) -> ExecResult {
    let message = match args.first() {
        Some(v) => Value::str(interp.coerce_string(v)?),
        None => Value::str(""),
    };
    let code = match args.get(1) {
        Some(v) => Value::int(crate::value::convert::to_int(v)),
        None => Value::int(0),
    };
    let name_message = interp.interner().intern("message");
    let name_code = interp.interner().intern("code");
    let mut data = this.borrow_mut();
    data.props.set(name_message, message);
    data.props.set(name_code, code);
    Ok(Value::Null)
}

fn exception_get_message(
    interp: &mut Interpreter<'_>,
    this: &ObjRef,
    _args: &[Value],
) -> ExecResult {
    let name = interp.interner().intern("message");
    this.borrow()
        .props
        .get(name)
        .cloned()
        .ok_or_else(|| internal("exception instance lost its message property").into())
}

fn exception_get_code(
    interp: &mut Interpreter<'_>,
    this: &ObjRef,
    _args: &[Value],
) -> ExecResult {
    let name = interp.interner().intern("code");
    this.borrow()
        .props
        .get(name)
        .cloned()
        .ok_or_else(|| internal("exception instance lost its code property").into())
}
