//! Scalar conversions: truthiness, to-int, to-float, to-string.
//!
//! Object-to-string goes through `__toString` and therefore lives in the
//! interpreter (`Interpreter::coerce_string`); everything here is
//! side-effect free.

use crate::value::{ArrayValue, Value};

/// A number a string or value coerces to: int when it reads as one,
/// float otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    pub fn as_float(self) -> f64 {
        match self {
            #[expect(clippy::cast_precision_loss, reason = "int-to-float widening")]
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }
}

/// Boolean coercion. Empty string and `"0"` are false; every object,
/// closure, and resource is true; an array is true iff non-empty.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Str(s) => !s.is_empty() && &**s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) | Value::Closure(_) | Value::Generator(_) | Value::Resource(_) => true,
    }
}

/// Parse the numeric prefix of a string: optional sign, digits, optional
/// fraction/exponent, surrounded by optional ASCII whitespace. Returns
/// `None` when no leading number exists.
pub fn str_to_numeric(s: &str) -> Option<Numeric> {
    let t = s.trim_matches([' ', '\t', '\n', '\r']);
    if t.is_empty() {
        return None;
    }
    // Longest prefix that parses as a number.
    let bytes = t.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    while end < bytes.len() {
        let b = bytes[end];
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'+' | b'-' if end == 0 => {}
            b'+' | b'-' if matches!(bytes[end - 1], b'e' | b'E') => {}
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => {
                seen_exp = true;
                seen_digit = false;
            }
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    let prefix = &t[..end];
    if !seen_dot && !seen_exp {
        if let Ok(i) = prefix.parse::<i64>() {
            return Some(Numeric::Int(i));
        }
        // Integer out of i64 range widens to float.
    }
    prefix.parse::<f64>().ok().map(Numeric::Float)
}

/// `true` when the whole string reads as a number (the `is_numeric`
/// builtin and numeric-string comparison).
pub fn is_numeric_str(s: &str) -> bool {
    let t = s.trim_matches([' ', '\t', '\n', '\r']);
    if t.is_empty() {
        return false;
    }
    t.parse::<i64>().is_ok() || t.parse::<f64>().is_ok_and(f64::is_finite)
}

/// The number a value coerces to, if any. Strings must carry a numeric
/// prefix; null and bools coerce to 0/1.
pub fn value_to_numeric(value: &Value) -> Option<Numeric> {
    match value {
        Value::Null => Some(Numeric::Int(0)),
        Value::Bool(b) => Some(Numeric::Int(i64::from(*b))),
        Value::Int(i) => Some(Numeric::Int(*i)),
        Value::Float(f) => Some(Numeric::Float(*f)),
        Value::Str(s) => str_to_numeric(s),
        _ => None,
    }
}

/// Integer coercion (`(int)` cast, `intval`).
pub fn to_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Int(i) => *i,
        Value::Float(f) => float_to_int(*f),
        Value::Str(s) => match str_to_numeric(s) {
            Some(Numeric::Int(i)) => i,
            Some(Numeric::Float(f)) => float_to_int(f),
            None => 0,
        },
        Value::Array(a) => i64::from(!a.is_empty()),
        Value::Object(_) | Value::Closure(_) | Value::Generator(_) => 1,
        Value::Resource(r) => r.handle,
    }
}

#[expect(clippy::cast_possible_truncation, reason = "float-to-int truncates")]
fn float_to_int(f: f64) -> i64 {
    if f.is_nan() {
        0
    } else {
        f as i64
    }
}

/// Float coercion (`(float)` cast, `floatval`, arithmetic widening).
pub fn to_float(value: &Value) -> f64 {
    match value {
        Value::Str(s) => str_to_numeric(s).map_or(0.0, Numeric::as_float),
        #[expect(clippy::cast_precision_loss, reason = "int-to-float widening")]
        other => to_int(other) as f64,
    }
}

/// Render a float the way `echo` does: integral values drop the
/// fractional part, everything else uses the shortest round-trip form.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if f == f.trunc() && f.abs() < 1e15 {
        #[expect(clippy::cast_possible_truncation, reason = "integral and in range")]
        return format!("{}", f as i64);
    }
    format!("{f}")
}

/// String coercion for non-object values. Returns `None` for objects,
/// closures, and generators, which need `__toString` dispatch.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(if *b { "1".to_string() } else { String::new() }),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(format_float(*f)),
        Value::Str(s) => Some(s.to_string()),
        Value::Array(_) => Some("Array".to_string()),
        Value::Resource(r) => Some(format!("Resource id #{}", r.handle)),
        Value::Object(_) | Value::Closure(_) | Value::Generator(_) => None,
    }
}

/// `(array)` cast for non-object values: arrays pass through, null
/// becomes empty, scalars wrap at key 0. Objects are handled by the
/// interpreter, which has the interner to render property names as keys.
pub fn scalar_to_array(value: &Value) -> ArrayValue {
    match value {
        Value::Array(a) => a.clone(),
        Value::Null => ArrayValue::new(),
        other => ArrayValue::from_values([other.clone()]),
    }
}
