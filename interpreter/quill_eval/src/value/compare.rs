//! Value comparison: loose `==`, strict `===`, and the three-way compare.
//!
//! The three-way compare underlies the `<`-family operators and the
//! `min`/`max`/`sort`/`usort` builtins uniformly.
//!
//! Number-vs-string comparison only goes numeric when the string reads
//! as a number in full; otherwise the number is rendered as a string and
//! the comparison is byte-wise. `"0" == 0` holds, `"abc" == 0` does not.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::value::convert::{
    format_float, is_numeric_str, str_to_numeric, truthy, value_to_numeric, Numeric,
};
use crate::value::{ArrayValue, Value};

/// Loose, type-coercing equality (`==`).
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        // A bool on either side compares by truthiness.
        (Value::Bool(_), _) | (_, Value::Bool(_)) => truthy(a) == truthy(b),
        // Null against a string compares as the empty string.
        (Value::Null, Value::Str(s)) | (Value::Str(s), Value::Null) => s.is_empty(),
        (Value::Null, _) | (_, Value::Null) => !truthy(a) && !truthy(b),

        (Value::Int(x), Value::Int(y)) => x == y,
        #[expect(clippy::cast_precision_loss, reason = "int-to-float widening")]
        (Value::Int(x), Value::Float(y)) => *x as f64 == *y,
        #[expect(clippy::cast_precision_loss, reason = "int-to-float widening")]
        (Value::Float(x), Value::Int(y)) => *x == *y as f64,
        (Value::Float(x), Value::Float(y)) => x == y,

        (Value::Str(x), Value::Str(y)) => {
            if is_numeric_str(x) && is_numeric_str(y) {
                numeric_eq(str_to_numeric(x), str_to_numeric(y))
            } else {
                x == y
            }
        }
        (Value::Int(_) | Value::Float(_), Value::Str(s))
        | (Value::Str(s), Value::Int(_) | Value::Float(_)) => {
            if is_numeric_str(s) {
                numeric_eq(value_to_numeric(a), value_to_numeric(b))
            } else {
                false
            }
        }

        (Value::Array(x), Value::Array(y)) => loose_array_eq(x, y),
        (Value::Object(x), Value::Object(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.class == y.class
                && x.props.len() == y.props.len()
                && x.props
                    .iter()
                    .all(|(name, v)| y.props.get(*name).is_some_and(|w| loose_eq(v, w)))
        }
        (Value::Closure(x), Value::Closure(y)) => Rc::ptr_eq(x, y),
        (Value::Generator(x), Value::Generator(y)) => Rc::ptr_eq(x, y),
        (Value::Resource(x), Value::Resource(y)) => x == y,
        _ => false,
    }
}

fn numeric_eq(a: Option<Numeric>, b: Option<Numeric>) -> bool {
    match (a, b) {
        (Some(Numeric::Int(x)), Some(Numeric::Int(y))) => x == y,
        (Some(x), Some(y)) => x.as_float() == y.as_float(),
        _ => false,
    }
}

/// `==` on arrays ignores entry order: same size, every key present on
/// both sides with loosely equal values.
fn loose_array_eq(a: &ArrayValue, b: &ArrayValue) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(key, v)| b.get(key).is_some_and(|w| loose_eq(v, w)))
}

/// Identity (`===`): same type and value, same instance for objects.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && strict_eq(va, vb))
        }
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Closure(x), Value::Closure(y)) => Rc::ptr_eq(x, y),
        (Value::Generator(x), Value::Generator(y)) => Rc::ptr_eq(x, y),
        (Value::Resource(x), Value::Resource(y)) => x == y,
        _ => false,
    }
}

/// Three-way compare (`<=>`). Total: incomparable pairs order by
/// truthiness so sorting mixed arrays never fails.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        // Bool or null on either side: truthiness decides.
        (Value::Bool(_) | Value::Null, _) | (_, Value::Bool(_) | Value::Null) => {
            truthy(a).cmp(&truthy(b))
        }

        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Str(x), Value::Str(y)) => {
            if is_numeric_str(x) && is_numeric_str(y) {
                numeric_cmp(str_to_numeric(x), str_to_numeric(y))
            } else {
                x.cmp(y)
            }
        }
        (Value::Int(_) | Value::Float(_), Value::Float(_) | Value::Int(_)) => {
            numeric_cmp(value_to_numeric(a), value_to_numeric(b))
        }
        (Value::Int(x), Value::Str(s)) => {
            if is_numeric_str(s) {
                numeric_cmp(value_to_numeric(a), str_to_numeric(s))
            } else {
                x.to_string().as_str().cmp(s)
            }
        }
        (Value::Str(s), Value::Int(y)) => {
            if is_numeric_str(s) {
                numeric_cmp(str_to_numeric(s), value_to_numeric(b))
            } else {
                s.as_ref().cmp(y.to_string().as_str())
            }
        }
        (Value::Float(x), Value::Str(s)) => {
            if is_numeric_str(s) {
                numeric_cmp(value_to_numeric(a), str_to_numeric(s))
            } else {
                format_float(*x).as_str().cmp(s)
            }
        }
        (Value::Str(s), Value::Float(y)) => {
            if is_numeric_str(s) {
                numeric_cmp(str_to_numeric(s), value_to_numeric(b))
            } else {
                s.as_ref().cmp(format_float(*y).as_str())
            }
        }

        (Value::Array(x), Value::Array(y)) => {
            let by_len = x.len().cmp(&y.len());
            if by_len != Ordering::Equal {
                return by_len;
            }
            for (key, v) in x.iter() {
                match y.get(key) {
                    Some(w) => {
                        let ord = compare(v, w);
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                    None => return Ordering::Greater,
                }
            }
            Ordering::Equal
        }

        _ => truthy(a).cmp(&truthy(b)),
    }
}

fn numeric_cmp(a: Option<Numeric>, b: Option<Numeric>) -> Ordering {
    match (a, b) {
        (Some(Numeric::Int(x)), Some(Numeric::Int(y))) => x.cmp(&y),
        (Some(x), Some(y)) => x
            .as_float()
            .partial_cmp(&y.as_float())
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}
