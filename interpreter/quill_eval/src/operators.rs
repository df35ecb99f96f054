//! Binary and unary operator semantics over values.
//!
//! Arithmetic follows the int/float lattice: the result is Float when
//! either operand is Float (or a float-reading numeric string), Int
//! otherwise; int overflow widens to Float. Division by zero is a
//! terminal evaluator error, not a catchable exception.
//!
//! The short-circuit operators (`&&`, `||`, `??`) and string
//! concatenation never reach this module: they need expression-level
//! control (untaken operands, `__toString` dispatch) and live in the
//! expression evaluator.

use std::cmp::Ordering;

use quill_ir::{BinaryOp, CastKind, UnaryOp};

use crate::signal::{
    division_by_zero, internal, invalid_operand, modulo_by_zero, EvalError,
};
use crate::value::compare::{compare, loose_eq, strict_eq};
use crate::value::convert::{
    scalar_to_array, to_float, to_int, truthy, value_to_numeric, Numeric,
};
use crate::value::Value;

/// Evaluate a binary operator over two already-evaluated operands.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => {
            // `+` on two arrays is union: left entries win, right fills
            // in missing keys.
            if let (Value::Array(a), Value::Array(b)) = (left, right) {
                let mut union = a.clone();
                for (key, value) in b.iter() {
                    if !union.contains_key(key) {
                        union.insert(key.clone(), value.clone());
                    }
                }
                return Ok(Value::array(union));
            }
            arith(op, left, right, i64::checked_add, |x, y| x + y)
        }
        BinaryOp::Sub => arith(op, left, right, i64::checked_sub, |x, y| x - y),
        BinaryOp::Mul => arith(op, left, right, i64::checked_mul, |x, y| x * y),
        BinaryOp::Div => divide(left, right),
        BinaryOp::Mod => modulo(left, right),
        BinaryOp::Pow => power(left, right),

        BinaryOp::Eq => Ok(Value::bool(loose_eq(left, right))),
        BinaryOp::NotEq => Ok(Value::bool(!loose_eq(left, right))),
        BinaryOp::Identical => Ok(Value::bool(strict_eq(left, right))),
        BinaryOp::NotIdentical => Ok(Value::bool(!strict_eq(left, right))),
        BinaryOp::Lt => Ok(Value::bool(compare(left, right) == Ordering::Less)),
        BinaryOp::LtEq => Ok(Value::bool(compare(left, right) != Ordering::Greater)),
        BinaryOp::Gt => Ok(Value::bool(compare(left, right) == Ordering::Greater)),
        BinaryOp::GtEq => Ok(Value::bool(compare(left, right) != Ordering::Less)),
        BinaryOp::Spaceship => Ok(Value::int(match compare(left, right) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        })),

        BinaryOp::BitAnd => Ok(Value::int(to_int(left) & to_int(right))),
        BinaryOp::BitOr => Ok(Value::int(to_int(left) | to_int(right))),
        BinaryOp::BitXor => Ok(Value::int(to_int(left) ^ to_int(right))),
        BinaryOp::Shl => shift(left, right, true),
        BinaryOp::Shr => shift(left, right, false),

        BinaryOp::Concat | BinaryOp::And | BinaryOp::Or | BinaryOp::Coalesce => Err(internal(
            format!("operator {} must be dispatched by the expression evaluator", op.as_symbol()),
        )),
    }
}

fn numeric_operand(op: BinaryOp, value: &Value) -> Result<Numeric, EvalError> {
    value_to_numeric(value).ok_or_else(|| invalid_operand(op.as_symbol(), value.type_name()))
}

/// Shared int/float arithmetic shape: checked int op widening to float
/// on overflow, float op otherwise.
fn arith(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    let l = numeric_operand(op, left)?;
    let r = numeric_operand(op, right)?;
    Ok(match (l, r) {
        (Numeric::Int(x), Numeric::Int(y)) => match int_op(x, y) {
            Some(result) => Value::int(result),
            None => Value::float(float_op(l.as_float(), r.as_float())),
        },
        _ => Value::float(float_op(l.as_float(), r.as_float())),
    })
}

fn divide(left: &Value, right: &Value) -> Result<Value, EvalError> {
    let l = numeric_operand(BinaryOp::Div, left)?;
    let r = numeric_operand(BinaryOp::Div, right)?;
    match r {
        Numeric::Int(0) => Err(division_by_zero()),
        Numeric::Float(f) if f == 0.0 => Err(division_by_zero()),
        Numeric::Int(y) => match l {
            // Int result only when the division is exact.
            Numeric::Int(x) if x % y == 0 => match x.checked_div(y) {
                Some(q) => Ok(Value::int(q)),
                None => Ok(Value::float(l.as_float() / r.as_float())),
            },
            _ => Ok(Value::float(l.as_float() / r.as_float())),
        },
        Numeric::Float(_) => Ok(Value::float(l.as_float() / r.as_float())),
    }
}

fn modulo(left: &Value, right: &Value) -> Result<Value, EvalError> {
    // `%` is integer modulo; operands coerce to int first.
    let x = to_int(left);
    let y = to_int(right);
    if y == 0 {
        return Err(modulo_by_zero());
    }
    // i64::MIN % -1 would overflow; the mathematical result is 0.
    Ok(Value::int(x.checked_rem(y).unwrap_or(0)))
}

fn power(left: &Value, right: &Value) -> Result<Value, EvalError> {
    let l = numeric_operand(BinaryOp::Pow, left)?;
    let r = numeric_operand(BinaryOp::Pow, right)?;
    if let (Numeric::Int(base), Numeric::Int(exp)) = (l, r) {
        if exp >= 0 {
            if let Ok(exp) = u32::try_from(exp) {
                if let Some(result) = base.checked_pow(exp) {
                    return Ok(Value::int(result));
                }
            }
        }
    }
    Ok(Value::float(l.as_float().powf(r.as_float())))
}

fn shift(left: &Value, right: &Value, is_left: bool) -> Result<Value, EvalError> {
    let x = to_int(left);
    let by = to_int(right);
    if by < 0 {
        return Err(invalid_operand(if is_left { "<<" } else { ">>" }, "negative shift"));
    }
    if is_left {
        // Shifting past the width yields 0.
        Ok(Value::int(
            u32::try_from(by)
                .ok()
                .and_then(|b| x.checked_shl(b))
                .unwrap_or(0),
        ))
    } else {
        // Arithmetic right shift saturates at the sign bit.
        let by = by.min(63);
        #[expect(clippy::cast_possible_truncation, reason = "clamped to 0..=63")]
        Ok(Value::int(x >> by as u32))
    }
}

/// Evaluate a unary operator.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Neg => match value_to_numeric(operand) {
            Some(Numeric::Int(i)) => Ok(i
                .checked_neg()
                .map_or_else(|| Value::float(-Numeric::Int(i).as_float()), Value::int)),
            Some(Numeric::Float(f)) => Ok(Value::float(-f)),
            None => Err(invalid_operand("-", operand.type_name())),
        },
        UnaryOp::Not => Ok(Value::bool(!truthy(operand))),
        UnaryOp::BitNot => Ok(Value::int(!to_int(operand))),
    }
}

/// Evaluate a scalar cast. `(string)` on objects needs `__toString` and
/// is handled by the expression evaluator before calling here.
pub fn evaluate_cast(kind: CastKind, value: &Value) -> Value {
    match kind {
        CastKind::Int => Value::int(to_int(value)),
        CastKind::Float => Value::float(to_float(value)),
        CastKind::Bool => Value::bool(truthy(value)),
        CastKind::String => match crate::value::convert::scalar_to_string(value) {
            Some(s) => Value::str(s),
            None => Value::Null,
        },
        CastKind::Array => Value::array(scalar_to_array(value)),
    }
}
