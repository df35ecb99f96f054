//! The builtin function table.
//!
//! Builtins are consulted before user-defined functions and are opaque
//! to the evaluator: `name → fn(&mut Interpreter, &mut [Value])`. A
//! builtin marked `writes_back_first` mutates its first argument in
//! place (sorting, array push, cursor movement); the call evaluator
//! assigns the mutated value back through the original lvalue, which is
//! how these functions observe reference semantics without a general
//! by-reference parameter mechanism.
//!
//! This is the starter catalog; hosts extend it by registering more
//! entries at interpreter construction.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use quill_ir::{Name, StringInterner};

use crate::interp::Interpreter;
use crate::signal::{EvalError, EvalErrorKind, ExecResult, Signal};
use crate::value::compare::{compare, loose_eq, strict_eq};
use crate::value::convert::{self, format_float, to_float, to_int, truthy};
use crate::value::{ArrayKey, ArrayValue, Value};

/// Signature of a builtin. Arguments arrive evaluated; mutations to the
/// slice are only meaningful for `writes_back_first` builtins.
pub type BuiltinFn = fn(&mut Interpreter<'_>, &mut [Value]) -> ExecResult;

/// One catalog entry.
pub struct BuiltinDef {
    pub name: &'static str,
    pub run: BuiltinFn,
    /// The first argument is by-reference: the caller writes the
    /// (possibly mutated) value back to the argument's lvalue.
    pub writes_back_first: bool,
}

/// Name-keyed builtin table.
pub struct BuiltinRegistry {
    table: FxHashMap<Name, &'static BuiltinDef>,
}

impl BuiltinRegistry {
    /// The standard catalog, with every name pre-interned.
    pub fn standard(interner: &StringInterner) -> Self {
        let table = CATALOG
            .iter()
            .map(|def| (interner.intern(def.name), def))
            .collect();
        BuiltinRegistry { table }
    }

    pub fn get(&self, name: Name) -> Option<&'static BuiltinDef> {
        self.table.get(&name).copied()
    }

    pub fn contains(&self, name: Name) -> bool {
        self.table.contains_key(&name)
    }
}

macro_rules! entry {
    ($name:literal, $func:ident) => {
        BuiltinDef {
            name: $name,
            run: $func,
            writes_back_first: false,
        }
    };
    ($name:literal, $func:ident, writes_first) => {
        BuiltinDef {
            name: $name,
            run: $func,
            writes_back_first: true,
        }
    };
}

static CATALOG: &[BuiltinDef] = &[
    entry!("strlen", builtin_strlen),
    entry!("count", builtin_count),
    entry!("gettype", builtin_gettype),
    entry!("is_int", builtin_is_int),
    entry!("is_float", builtin_is_float),
    entry!("is_string", builtin_is_string),
    entry!("is_bool", builtin_is_bool),
    entry!("is_array", builtin_is_array),
    entry!("is_null", builtin_is_null),
    entry!("is_object", builtin_is_object),
    entry!("is_callable", builtin_is_callable),
    entry!("is_numeric", builtin_is_numeric),
    entry!("intval", builtin_intval),
    entry!("floatval", builtin_floatval),
    entry!("strval", builtin_strval),
    entry!("boolval", builtin_boolval),
    entry!("min", builtin_min),
    entry!("max", builtin_max),
    entry!("sort", builtin_sort, writes_first),
    entry!("usort", builtin_usort, writes_first),
    entry!("array_keys", builtin_array_keys),
    entry!("array_values", builtin_array_values),
    entry!("array_push", builtin_array_push, writes_first),
    entry!("array_key_exists", builtin_array_key_exists),
    entry!("in_array", builtin_in_array),
    entry!("reset", builtin_reset, writes_first),
    entry!("next", builtin_next, writes_first),
    entry!("current", builtin_current),
    entry!("key", builtin_key),
    entry!("var_dump", builtin_var_dump),
    entry!("function_exists", builtin_function_exists),
    entry!("class_exists", builtin_class_exists),
    entry!("get_class", builtin_get_class),
];

fn arg_error(message: impl Into<String>) -> Signal {
    EvalError::new(EvalErrorKind::InvalidOperand, message).into()
}

fn builtin_strlen(interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let s = match args.first() {
        Some(v) => interp.coerce_string(v)?,
        None => return Err(arg_error("strlen() expects a string")),
    };
    Ok(Value::int(i64::try_from(s.len()).unwrap_or(i64::MAX)))
}

fn builtin_count(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let n = match args.first() {
        Some(Value::Array(a)) => a.len(),
        Some(Value::Generator(g)) => g.entries.len(),
        Some(Value::Null) => 0,
        Some(_) => 1,
        None => return Err(arg_error("count() expects an argument")),
    };
    Ok(Value::int(i64::try_from(n).unwrap_or(i64::MAX)))
}

fn builtin_gettype(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    // The legacy spellings, not the `type_name` diagnostics ones.
    let name = match args.first() {
        Some(Value::Null) => "NULL",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Int(_)) => "integer",
        Some(Value::Float(_)) => "double",
        Some(Value::Str(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_) | Value::Closure(_) | Value::Generator(_)) => "object",
        Some(Value::Resource(_)) => "resource",
        None => return Err(arg_error("gettype() expects an argument")),
    };
    Ok(Value::str(name))
}

macro_rules! type_predicate {
    ($func:ident, $pattern:pat) => {
        fn $func(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
            Ok(Value::bool(matches!(args.first(), Some($pattern))))
        }
    };
}

type_predicate!(builtin_is_int, Value::Int(_));
type_predicate!(builtin_is_float, Value::Float(_));
type_predicate!(builtin_is_string, Value::Str(_));
type_predicate!(builtin_is_bool, Value::Bool(_));
type_predicate!(builtin_is_array, Value::Array(_));
type_predicate!(builtin_is_null, Value::Null);
type_predicate!(
    builtin_is_object,
    Value::Object(_) | Value::Closure(_) | Value::Generator(_)
);

fn builtin_is_callable(interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let callable = match args.first() {
        Some(Value::Closure(_)) => true,
        Some(Value::Str(s)) => {
            let name = interp.interner().intern(s);
            interp.function_exists(name)
        }
        Some(Value::Object(obj)) => {
            let class = obj.borrow().class;
            let invoke = interp.names().invoke;
            interp.registry().find_method(class, invoke).is_some()
        }
        _ => false,
    };
    Ok(Value::bool(callable))
}

fn builtin_is_numeric(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let numeric = match args.first() {
        Some(Value::Int(_) | Value::Float(_)) => true,
        Some(Value::Str(s)) => convert::is_numeric_str(s),
        _ => false,
    };
    Ok(Value::bool(numeric))
}

fn builtin_intval(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    Ok(Value::int(args.first().map_or(0, to_int)))
}

fn builtin_floatval(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    Ok(Value::float(args.first().map_or(0.0, to_float)))
}

fn builtin_strval(interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    match args.first() {
        Some(v) => Ok(Value::str(interp.coerce_string(v)?)),
        None => Ok(Value::str("")),
    }
}

fn builtin_boolval(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    Ok(Value::bool(args.first().is_some_and(truthy)))
}

fn extreme(args: &[Value], want: Ordering, name: &str) -> ExecResult {
    let candidates: Vec<Value> = match args {
        [Value::Array(a)] => a.values().cloned().collect(),
        _ => args.to_vec(),
    };
    let mut best: Option<Value> = None;
    for value in candidates {
        match &best {
            Some(current) if compare(&value, current) != want => {}
            _ => best = Some(value),
        }
    }
    best.ok_or_else(|| arg_error(format!("{name}() expects at least one value")))
}

fn builtin_min(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    extreme(args, Ordering::Less, "min")
}

fn builtin_max(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    extreme(args, Ordering::Greater, "max")
}

fn builtin_sort(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let Some(Value::Array(array)) = args.first_mut() else {
        return Err(arg_error("sort() expects an array"));
    };
    let mut values: Vec<Value> = array.values().cloned().collect();
    values.sort_by(compare);
    // sort() re-keys the result 0..n.
    *array = ArrayValue::from_values(values);
    Ok(Value::bool(true))
}

fn builtin_usort(interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let [first, comparator] = args else {
        return Err(arg_error("usort() expects an array and a comparator"));
    };
    let Value::Array(array) = first else {
        return Err(arg_error("usort() expects an array"));
    };
    let comparator = comparator.clone();
    let mut values: Vec<Value> = array.values().cloned().collect();

    // sort_by cannot propagate a signal; stash the first failure and
    // re-raise after the sort unwinds.
    let mut failure: Option<Signal> = None;
    values.sort_by(|a, b| {
        if failure.is_some() {
            return Ordering::Equal;
        }
        match interp.call_value(&comparator, vec![a.clone(), b.clone()]) {
            Ok(result) => to_int(&result).cmp(&0),
            Err(signal) => {
                failure = Some(signal);
                Ordering::Equal
            }
        }
    });
    if let Some(signal) = failure {
        return Err(signal);
    }
    *array = ArrayValue::from_values(values);
    Ok(Value::bool(true))
}

fn builtin_array_keys(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let Some(Value::Array(array)) = args.first() else {
        return Err(arg_error("array_keys() expects an array"));
    };
    Ok(Value::array(ArrayValue::from_values(
        array.keys().map(ArrayKey::to_value),
    )))
}

fn builtin_array_values(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let Some(Value::Array(array)) = args.first() else {
        return Err(arg_error("array_values() expects an array"));
    };
    Ok(Value::array(ArrayValue::from_values(
        array.values().cloned(),
    )))
}

fn builtin_array_push(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let (first, rest) = match args.split_first_mut() {
        Some(split) => split,
        None => return Err(arg_error("array_push() expects an array")),
    };
    let Value::Array(array) = first else {
        return Err(arg_error("array_push() expects an array"));
    };
    for value in rest {
        array.push(value.clone());
    }
    Ok(Value::int(i64::try_from(array.len()).unwrap_or(i64::MAX)))
}

fn builtin_array_key_exists(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let (Some(key), Some(Value::Array(array))) = (args.first(), args.get(1)) else {
        return Err(arg_error("array_key_exists() expects a key and an array"));
    };
    let Some(key) = ArrayKey::from_value(key) else {
        return Ok(Value::bool(false));
    };
    Ok(Value::bool(array.contains_key(&key)))
}

fn builtin_in_array(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let (Some(needle), Some(Value::Array(haystack))) = (args.first(), args.get(1)) else {
        return Err(arg_error("in_array() expects a needle and an array"));
    };
    let strict = args.get(2).is_some_and(truthy);
    let found = haystack.values().any(|candidate| {
        if strict {
            strict_eq(needle, candidate)
        } else {
            loose_eq(needle, candidate)
        }
    });
    Ok(Value::bool(found))
}

fn builtin_reset(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let Some(Value::Array(array)) = args.first_mut() else {
        return Err(arg_error("reset() expects an array"));
    };
    Ok(array
        .cursor_reset()
        .map_or(Value::bool(false), |(_, v)| v.clone()))
}

fn builtin_next(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let Some(Value::Array(array)) = args.first_mut() else {
        return Err(arg_error("next() expects an array"));
    };
    Ok(array
        .cursor_advance()
        .map_or(Value::bool(false), |(_, v)| v.clone()))
}

fn builtin_current(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let Some(Value::Array(array)) = args.first() else {
        return Err(arg_error("current() expects an array"));
    };
    Ok(array
        .cursor_current()
        .map_or(Value::bool(false), |(_, v)| v.clone()))
}

fn builtin_key(_interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let Some(Value::Array(array)) = args.first() else {
        return Err(arg_error("key() expects an array"));
    };
    Ok(array
        .cursor_current()
        .map_or(Value::Null, |(k, _)| k.to_value()))
}

fn builtin_var_dump(interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let mut rendered = String::new();
    for value in args.iter() {
        dump_into(interp, value, 0, &mut rendered);
    }
    interp.write_output(&rendered);
    Ok(Value::Null)
}

fn dump_into(interp: &Interpreter<'_>, value: &Value, depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth);
    match value {
        Value::Null => out.push_str(&format!("{pad}NULL\n")),
        Value::Bool(b) => out.push_str(&format!("{pad}bool({b})\n")),
        Value::Int(i) => out.push_str(&format!("{pad}int({i})\n")),
        Value::Float(f) => out.push_str(&format!("{pad}float({})\n", format_float(*f))),
        Value::Str(s) => out.push_str(&format!("{pad}string({}) \"{s}\"\n", s.len())),
        Value::Array(a) => {
            out.push_str(&format!("{pad}array({}) {{\n", a.len()));
            for (key, entry) in a.iter() {
                match key {
                    ArrayKey::Int(i) => out.push_str(&format!("{pad}  [{i}]=>\n")),
                    ArrayKey::Str(s) => out.push_str(&format!("{pad}  [\"{s}\"]=>\n")),
                }
                dump_into(interp, entry, depth + 1, out);
            }
            out.push_str(&format!("{pad}}}\n"));
        }
        Value::Object(obj) => {
            let data = obj.borrow();
            let class = interp.interner().lookup(interp.registry().class_name(data.class));
            out.push_str(&format!("{pad}object({class}) ({}) {{\n", data.props.len()));
            for (name, prop) in data.props.iter() {
                out.push_str(&format!(
                    "{pad}  [\"{}\"]=>\n",
                    interp.interner().lookup(*name)
                ));
                dump_into(interp, prop, depth + 1, out);
            }
            out.push_str(&format!("{pad}}}\n"));
        }
        Value::Closure(_) => out.push_str(&format!("{pad}object(Closure) (0) {{\n{pad}}}\n")),
        Value::Generator(g) => {
            out.push_str(&format!("{pad}object(Generator) ({}) {{\n{pad}}}\n", g.entries.len()));
        }
        Value::Resource(r) => {
            out.push_str(&format!("{pad}resource({}) of type ({})\n", r.handle, r.tag));
        }
    }
}

fn builtin_function_exists(interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let Some(Value::Str(s)) = args.first() else {
        return Ok(Value::bool(false));
    };
    let name = interp.interner().intern(s);
    Ok(Value::bool(interp.function_exists(name)))
}

fn builtin_class_exists(interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let Some(Value::Str(s)) = args.first() else {
        return Ok(Value::bool(false));
    };
    let name = interp.interner().intern(s);
    Ok(Value::bool(interp.registry().class_id(name).is_some()))
}

fn builtin_get_class(interp: &mut Interpreter<'_>, args: &mut [Value]) -> ExecResult {
    let Some(Value::Object(obj)) = args.first() else {
        return Err(arg_error("get_class() expects an object"));
    };
    let class = obj.borrow().class;
    let name = interp.registry().class_name(class);
    Ok(Value::str(interp.interner().lookup(name)))
}
