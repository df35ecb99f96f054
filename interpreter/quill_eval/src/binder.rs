//! Argument-to-parameter binding.
//!
//! Positional arguments bind left to right; named arguments bind by
//! parameter name; a trailing variadic parameter collects the remaining
//! positional values into an array. Spread arguments are expanded by the
//! caller before binding (int keys positional, string keys named), so
//! this module sees a flat argument list.
//!
//! Unbound parameters fall back to their default value, which was
//! evaluated once at declaration time and is reused verbatim — never
//! re-evaluated per call. Under `strict_types` a declared-type mismatch
//! is a binding error with no coercion, except the standard int-to-float
//! widening; in weak mode scalars coerce where a faithful reading
//! exists.

use quill_ir::{Name, Param, StringInterner, TypeExpr, TypeHint};

use crate::classes::ClassRegistry;
use crate::signal::{
    argument_type_mismatch, duplicate_argument, missing_argument, unknown_named_argument,
    EvalError, EvalErrorKind,
};
use crate::value::convert::{is_numeric_str, str_to_numeric, truthy, Numeric};
use crate::value::{ArrayValue, Value};

/// One call-site argument after evaluation and spread expansion.
#[derive(Debug)]
pub struct CallArg {
    pub name: Option<Name>,
    pub value: Value,
}

impl CallArg {
    pub fn positional(value: Value) -> Self {
        CallArg { name: None, value }
    }

    pub fn named(name: Name, value: Value) -> Self {
        CallArg {
            name: Some(name),
            value,
        }
    }
}

/// What binding needs to know about the surrounding interpreter.
pub struct BindContext<'a> {
    pub interner: &'a StringInterner,
    pub registry: &'a ClassRegistry,
    pub strict_types: bool,
}

/// Bind an argument list to a parameter list.
///
/// The result is aligned with `params`: one value per parameter, with a
/// trailing variadic parameter receiving the packed array.
pub fn bind_arguments(
    cx: &BindContext<'_>,
    params: &[Param],
    defaults: &[Option<Value>],
    args: Vec<CallArg>,
) -> Result<Vec<Value>, EvalError> {
    let variadic = params.last().filter(|p| p.variadic);
    let fixed = match variadic {
        Some(_) => &params[..params.len() - 1],
        None => params,
    };

    let mut slots: Vec<Option<Value>> = Vec::new();
    slots.resize_with(fixed.len(), || None);
    let mut rest: Vec<Value> = Vec::new();
    let mut cursor = 0usize;
    let mut seen_named = false;

    for arg in args {
        match arg.name {
            None => {
                if seen_named {
                    return Err(EvalError::new(
                        EvalErrorKind::ArgumentBinding,
                        "positional argument after named argument",
                    ));
                }
                if cursor < fixed.len() {
                    slots[cursor] = Some(arg.value);
                    cursor += 1;
                } else if variadic.is_some() {
                    rest.push(arg.value);
                }
                // Extra positional arguments without a variadic are
                // silently discarded.
            }
            Some(name) => {
                seen_named = true;
                let param_str = cx.interner.lookup(name);
                match fixed.iter().position(|p| p.name == name) {
                    Some(i) => {
                        if slots[i].is_some() {
                            return Err(duplicate_argument(param_str));
                        }
                        slots[i] = Some(arg.value);
                    }
                    None => return Err(unknown_named_argument(param_str)),
                }
            }
        }
    }

    let mut bound = Vec::with_capacity(params.len());
    for (i, param) in fixed.iter().enumerate() {
        match slots[i].take() {
            Some(value) => bound.push(check_param_type(cx, param, value)?),
            // Defaults were type-checked against the declaration; reuse
            // them as-is.
            None => match defaults.get(i).cloned().flatten() {
                Some(default) => bound.push(default),
                None => return Err(missing_argument(cx.interner.lookup(param.name))),
            },
        }
    }
    if let Some(param) = variadic {
        let mut packed = ArrayValue::new();
        for value in rest {
            packed.push(check_param_type(cx, param, value)?);
        }
        bound.push(Value::array(packed));
    }
    Ok(bound)
}

/// Check (and in weak mode coerce) one bound value against the
/// parameter's declared type.
fn check_param_type(
    cx: &BindContext<'_>,
    param: &Param,
    value: Value,
) -> Result<Value, EvalError> {
    let Some(ty) = param.ty else {
        return Ok(value);
    };
    if ty.nullable && value.is_null() {
        return Ok(value);
    }
    let mismatch =
        |value: &Value| argument_type_mismatch(
            cx.interner.lookup(param.name),
            hint_name(ty, cx.interner),
            value.type_name(),
        );

    match ty.hint {
        TypeHint::Int => match (&value, cx.strict_types) {
            (Value::Int(_), _) => Ok(value),
            (_, true) => Err(mismatch(&value)),
            (_, false) => weak_int(&value).ok_or_else(|| mismatch(&value)),
        },
        TypeHint::Float => match (&value, cx.strict_types) {
            (Value::Float(_), _) => Ok(value),
            // int → float widening is allowed even under strict_types.
            (Value::Int(i), _) => Ok(Value::float(Numeric::Int(*i).as_float())),
            (_, true) => Err(mismatch(&value)),
            (_, false) => weak_float(&value).ok_or_else(|| mismatch(&value)),
        },
        TypeHint::String => match (&value, cx.strict_types) {
            (Value::Str(_), _) => Ok(value),
            (_, true) => Err(mismatch(&value)),
            (Value::Int(_) | Value::Float(_) | Value::Bool(_), false) => {
                match crate::value::convert::scalar_to_string(&value) {
                    Some(s) => Ok(Value::str(s)),
                    None => Err(mismatch(&value)),
                }
            }
            (_, false) => Err(mismatch(&value)),
        },
        TypeHint::Bool => match (&value, cx.strict_types) {
            (Value::Bool(_), _) => Ok(value),
            (_, true) => Err(mismatch(&value)),
            (Value::Int(_) | Value::Float(_) | Value::Str(_), false) => {
                Ok(Value::bool(truthy(&value)))
            }
            (_, false) => Err(mismatch(&value)),
        },
        TypeHint::Array => match value {
            Value::Array(_) => Ok(value),
            _ => Err(mismatch(&value)),
        },
        TypeHint::Object => match value {
            // Closures and generators are objects in the language.
            Value::Object(_) | Value::Closure(_) | Value::Generator(_) => Ok(value),
            _ => Err(mismatch(&value)),
        },
        TypeHint::Callable => match &value {
            Value::Closure(_) | Value::Str(_) => Ok(value),
            // An object is callable when its class defines `__invoke`.
            Value::Object(obj) => {
                let class = obj.borrow().class;
                let invoke = cx.interner.intern("__invoke");
                if cx.registry.find_method(class, invoke).is_some() {
                    Ok(value)
                } else {
                    Err(mismatch(&value))
                }
            }
            _ => Err(mismatch(&value)),
        },
        TypeHint::Iterable => match value {
            Value::Array(_) | Value::Generator(_) => Ok(value),
            _ => Err(mismatch(&value)),
        },
        TypeHint::Named(class_name) => {
            if let Value::Object(obj) = &value {
                let class = obj.borrow().class;
                let ok = match cx.registry.class_id(class_name) {
                    Some(target) => cx.registry.is_subclass_or_self(class, target),
                    None => cx
                        .registry
                        .interface_id(class_name)
                        .is_some_and(|iface| cx.registry.implements(class, iface)),
                };
                if ok {
                    return Ok(value);
                }
            }
            Err(mismatch(&value))
        }
    }
}

/// Lossless int reading of a scalar, weak mode only.
fn weak_int(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(b) => Some(Value::int(i64::from(*b))),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => {
            #[expect(clippy::cast_possible_truncation, reason = "integral by check above")]
            Some(Value::int(*f as i64))
        }
        Value::Str(s) if is_numeric_str(s) => match str_to_numeric(s) {
            Some(Numeric::Int(i)) => Some(Value::int(i)),
            #[expect(clippy::cast_possible_truncation, reason = "integral by check")]
            Some(Numeric::Float(f)) if f.fract() == 0.0 => Some(Value::int(f as i64)),
            _ => None,
        },
        _ => None,
    }
}

/// Float reading of a scalar, weak mode only.
fn weak_float(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(b) => Some(Value::float(f64::from(u8::from(*b)))),
        Value::Str(s) if is_numeric_str(s) => {
            str_to_numeric(s).map(|n| Value::float(n.as_float()))
        }
        _ => None,
    }
}

fn hint_name(ty: TypeExpr, interner: &StringInterner) -> &'static str {
    match ty.hint {
        TypeHint::Int => "int",
        TypeHint::Float => "float",
        TypeHint::String => "string",
        TypeHint::Bool => "bool",
        TypeHint::Array => "array",
        TypeHint::Object => "object",
        TypeHint::Callable => "callable",
        TypeHint::Iterable => "iterable",
        TypeHint::Named(name) => interner.lookup(name),
    }
}
