//! Arithmetic, comparison, and short-circuit semantics end to end.

use pretty_assertions::assert_eq;

use quill_ir::{BinaryOp, ProgramBuilder};

use super::{assert_int, run};
use crate::signal::EvalErrorKind;
use crate::value::Value;

#[test]
fn int_plus_int_stays_int() {
    let mut b = ProgramBuilder::new();
    let one = b.int(1);
    let one2 = b.int(1);
    let sum = b.binary(BinaryOp::Add, one, one2);
    let assign = b.assign_var("r", sum);
    let s = b.expr_stmt(assign);
    let program = b.finish(vec![s]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("r"), Value::int(2));
}

#[test]
fn int_plus_float_widens() {
    let mut b = ProgramBuilder::new();
    let one = b.int(1);
    let onef = b.float(1.0);
    let sum = b.binary(BinaryOp::Add, one, onef);
    let assign = b.assign_var("r", sum);
    let s = b.expr_stmt(assign);
    let program = b.finish(vec![s]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("r"), Value::float(2.0));
}

#[test]
fn uneven_division_yields_float() {
    let mut b = ProgramBuilder::new();
    let ten = b.int(10);
    let three = b.int(3);
    let quot = b.binary(BinaryOp::Div, ten, three);
    let assign = b.assign_var("r", quot);
    let s = b.expr_stmt(assign);
    let program = b.finish(vec![s]);
    let r = run(&program);
    r.assert_complete();
    match r.global("r") {
        Value::Float(f) => assert!((f - 10.0 / 3.0).abs() < 1e-12),
        other => panic!("expected float, got {other:?}"),
    }
}

#[test]
fn division_by_zero_is_fatal_not_catchable() {
    let mut b = ProgramBuilder::new();
    let ten = b.int(10);
    let zero = b.int(0);
    let quot = b.binary(BinaryOp::Div, ten, zero);
    // Even inside try/catch: errors are not exceptions.
    let s = b.expr_stmt(quot);
    let t = b.try_stmt(vec![s], vec![("Exception", "e", vec![])], None);
    let program = b.finish(vec![t]);
    let r = run(&program);
    assert_eq!(r.expect_fatal().kind, EvalErrorKind::DivisionByZero);
}

#[test]
fn loose_and_strict_equality_of_numeric_string() {
    let mut b = ProgramBuilder::new();
    let zero_str = b.str("0");
    let zero = b.int(0);
    let loose = b.binary(BinaryOp::Eq, zero_str, zero);
    let a1 = b.assign_var("loose", loose);
    let s1 = b.expr_stmt(a1);
    let zero_str2 = b.str("0");
    let zero2 = b.int(0);
    let strict = b.binary(BinaryOp::Identical, zero_str2, zero2);
    let a2 = b.assign_var("strict", strict);
    let s2 = b.expr_stmt(a2);
    let program = b.finish(vec![s1, s2]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("loose"), Value::bool(true));
    assert_eq!(r.global("strict"), Value::bool(false));
}

#[test]
fn and_does_not_evaluate_right_side_when_left_is_false() {
    let mut b = ProgramBuilder::new();
    let zero = b.int(0);
    let init = b.assign_var("x", zero);
    let s1 = b.expr_stmt(init);
    let fls = b.bool(false);
    let ninety_nine = b.int(99);
    let side_effect = b.assign_var("x", ninety_nine);
    let and = b.binary(BinaryOp::And, fls, side_effect);
    let a = b.assign_var("r", and);
    let s2 = b.expr_stmt(a);
    let program = b.finish(vec![s1, s2]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("r"), Value::bool(false));
    // The untaken branch's side effect never ran.
    assert_int(&r, "x", 0);
}

#[test]
fn or_short_circuits_on_truthy_left() {
    let mut b = ProgramBuilder::new();
    let zero = b.int(0);
    let init = b.assign_var("x", zero);
    let s1 = b.expr_stmt(init);
    let tru = b.bool(true);
    let ninety_nine = b.int(99);
    let side_effect = b.assign_var("x", ninety_nine);
    let or = b.binary(BinaryOp::Or, tru, side_effect);
    let a = b.assign_var("r", or);
    let s2 = b.expr_stmt(a);
    let program = b.finish(vec![s1, s2]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("r"), Value::bool(true));
    assert_int(&r, "x", 0);
}

#[test]
fn coalesce_takes_right_only_when_left_unset_or_null() {
    let mut b = ProgramBuilder::new();
    // $a = $missing ?? "fallback";
    let missing = b.var("missing");
    let fallback = b.str("fallback");
    let coalesce = b.binary(BinaryOp::Coalesce, missing, fallback);
    let a1 = b.assign_var("a", coalesce);
    let s1 = b.expr_stmt(a1);
    // $set = 5; $b = $set ?? 9;
    let five = b.int(5);
    let init = b.assign_var("set", five);
    let s2 = b.expr_stmt(init);
    let set = b.var("set");
    let nine = b.int(9);
    let coalesce2 = b.binary(BinaryOp::Coalesce, set, nine);
    let a2 = b.assign_var("b", coalesce2);
    let s3 = b.expr_stmt(a2);
    let program = b.finish(vec![s1, s2, s3]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("a"), Value::str("fallback"));
    assert_int(&r, "b", 5);
}

#[test]
fn concat_coerces_both_sides() {
    let mut b = ProgramBuilder::new();
    let prefix = b.str("n=");
    let n = b.int(7);
    let concat = b.binary(BinaryOp::Concat, prefix, n);
    let echo = b.echo(vec![concat]);
    let program = b.finish(vec![echo]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.output(), "n=7");
}

#[test]
fn spaceship_orders_mixed_numerics() {
    let mut b = ProgramBuilder::new();
    let two = b.int(2);
    let two_and_half = b.float(2.5);
    let cmp = b.binary(BinaryOp::Spaceship, two, two_and_half);
    let a = b.assign_var("r", cmp);
    let s = b.expr_stmt(a);
    let program = b.finish(vec![s]);
    let r = run(&program);
    r.assert_complete();
    assert_int(&r, "r", -1);
}

#[test]
fn short_ternary_reuses_condition_value() {
    let mut b = ProgramBuilder::new();
    let name = b.str("quill");
    let init = b.assign_var("name", name);
    let s1 = b.expr_stmt(init);
    let cond = b.var("name");
    let fallback = b.str("anon");
    let elvis = b.ternary(cond, None, fallback);
    let a = b.assign_var("r", elvis);
    let s2 = b.expr_stmt(a);
    let program = b.finish(vec![s1, s2]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("r"), Value::str("quill"));
}

#[test]
fn compound_assignment_reads_combines_writes() {
    let mut b = ProgramBuilder::new();
    let ten = b.int(10);
    let init = b.assign_var("x", ten);
    let s1 = b.expr_stmt(init);
    let target = b.var("x");
    let three = b.int(3);
    let add = b.assign_op(quill_ir::AssignOp::Add, target, three);
    let s2 = b.expr_stmt(add);
    let target2 = b.var("x");
    let suffix = b.str("!");
    let concat = b.assign_op(quill_ir::AssignOp::Concat, target2, suffix);
    let s3 = b.expr_stmt(concat);
    let program = b.finish(vec![s1, s2, s3]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("x"), Value::str("13!"));
}

#[test]
fn coalesce_assign_skips_write_and_rhs_when_set() {
    let mut b = ProgramBuilder::new();
    let one = b.int(1);
    let init = b.assign_var("x", one);
    let s1 = b.expr_stmt(init);
    let zero = b.int(0);
    let probe_init = b.assign_var("probe", zero);
    let s2 = b.expr_stmt(probe_init);
    // $x ??= ($probe = 99);  — $x is set, so neither side runs.
    let target = b.var("x");
    let ninety_nine = b.int(99);
    let rhs = b.assign_var("probe", ninety_nine);
    let coalesce = b.assign_op(quill_ir::AssignOp::Coalesce, target, rhs);
    let s3 = b.expr_stmt(coalesce);
    let program = b.finish(vec![s1, s2, s3]);
    let r = run(&program);
    r.assert_complete();
    assert_int(&r, "x", 1);
    assert_int(&r, "probe", 0);
}
