//! Namespaces: qualification of declarations, `use` aliases, and the
//! global fallback for builtins and core classes.

use pretty_assertions::assert_eq;

use quill_ir::{ClassRef, ProgramBuilder, UseKind};

use super::{assert_int, class_decl, method, run};
use crate::value::Value;

#[test]
fn declarations_qualify_with_the_current_namespace() {
    let mut b = ProgramBuilder::new();
    let ns = b.namespace("App");
    let one = b.int(1);
    let ret = b.ret(Some(one));
    let f = b.function("helper", vec![], vec![ret], false);
    // Inside App, a bare call resolves to App\helper.
    let call = b.call("helper", vec![]);
    let store = b.assign_var("r", call);
    let s = b.expr_stmt(store);
    let program = b.finish(vec![ns, f, s]);
    let r = run(&program);
    r.assert_complete();
    assert_int(&r, "r", 1);
}

#[test]
fn use_function_reaches_across_namespaces() {
    let mut b = ProgramBuilder::new();
    let ns_app = b.namespace("App");
    let one = b.int(1);
    let ret = b.ret(Some(one));
    let f = b.function("helper", vec![], vec![ret], false);
    let ns_main = b.namespace("Main");
    let use_f = b.use_decl(UseKind::Function, "App\\helper", None);
    let call = b.call("helper", vec![]);
    let store = b.assign_var("r", call);
    let s = b.expr_stmt(store);
    let program = b.finish(vec![ns_app, f, ns_main, use_f, s]);
    let r = run(&program);
    r.assert_complete();
    assert_int(&r, "r", 1);
}

#[test]
fn unimported_function_is_invisible_from_another_namespace() {
    let mut b = ProgramBuilder::new();
    let ns_app = b.namespace("App");
    let f = b.function("helper", vec![], vec![], false);
    let ns_main = b.namespace("Main");
    let call = b.call("helper", vec![]);
    let s = b.expr_stmt(call);
    let program = b.finish(vec![ns_app, f, ns_main, s]);
    let r = run(&program);
    assert_eq!(
        r.expect_fatal().kind,
        crate::signal::EvalErrorKind::UndefinedFunction
    );
}

#[test]
fn use_type_aliases_a_class() {
    let mut b = ProgramBuilder::new();
    let ns_app = b.namespace("App");
    let text = b.str("logged");
    let ret = b.ret(Some(text));
    let log = b.func("log", vec![], vec![ret], false);
    let mut logger = class_decl(&b, "Logger");
    logger.methods = vec![method(log)];
    let cls = b.class(logger);

    let ns_main = b.namespace("Main");
    let use_t = b.use_decl(UseKind::Type, "App\\Logger", None);
    let new = b.new_object(ClassRef::Named(b.name("Logger")), vec![]);
    let store = b.assign_var("l", new);
    let s1 = b.expr_stmt(store);
    let l = b.var("l");
    let call = b.method_call(l, "log", vec![]);
    let store_r = b.assign_var("r", call);
    let s2 = b.expr_stmt(store_r);

    let program = b.finish(vec![ns_app, cls, ns_main, use_t, s1, s2]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("r"), Value::str("logged"));
}

#[test]
fn builtins_stay_reachable_inside_namespaces() {
    let mut b = ProgramBuilder::new();
    let ns = b.namespace("App");
    let text = b.str("abc");
    let arg = b.arg(text);
    let call = b.call("strlen", vec![arg]);
    let store = b.assign_var("n", call);
    let s = b.expr_stmt(store);
    let program = b.finish(vec![ns, s]);
    let r = run(&program);
    r.assert_complete();
    assert_int(&r, "n", 3);
}

#[test]
fn core_exception_class_falls_back_to_global() {
    let mut b = ProgramBuilder::new();
    let ns = b.namespace("App");
    // new Exception inside App resolves App\Exception first, then the
    // bootstrapped global Exception.
    let msg = b.str("oops");
    let arg = b.arg(msg);
    let exc = b.new_object(ClassRef::Named(b.name("Exception")), vec![arg]);
    let throw = b.throw(exc);
    let e = b.var("e");
    let get = b.method_call(e, "getMessage", vec![]);
    let store = b.assign_var("msg", get);
    let catch_body = b.expr_stmt(store);
    let t = b.try_stmt(vec![throw], vec![("Exception", "e", vec![catch_body])], None);
    let program = b.finish(vec![ns, t]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("msg"), Value::str("oops"));
}

#[test]
fn leading_backslash_is_fully_qualified() {
    let mut b = ProgramBuilder::new();
    let ns_app = b.namespace("App");
    let one = b.int(1);
    let ret = b.ret(Some(one));
    let f = b.function("helper", vec![], vec![ret], false);
    // From Other, \App\helper() names it absolutely.
    let ns_other = b.namespace("Other");
    let call = b.call("\\App\\helper", vec![]);
    let store = b.assign_var("r", call);
    let s = b.expr_stmt(store);
    let program = b.finish(vec![ns_app, f, ns_other, s]);
    let r = run(&program);
    r.assert_complete();
    assert_int(&r, "r", 1);
}

#[test]
fn constants_qualify_and_alias() {
    let mut b = ProgramBuilder::new();
    let ns_app = b.namespace("App");
    let answer = b.int(42);
    let decl = b.const_stmt("ANSWER", answer);
    // Same namespace: bare fetch hits App\ANSWER.
    let fetch = b.const_fetch("ANSWER");
    let store = b.assign_var("a", fetch);
    let s1 = b.expr_stmt(store);
    // Other namespace: use const App\ANSWER.
    let ns_other = b.namespace("Other");
    let use_c = b.use_decl(UseKind::Constant, "App\\ANSWER", None);
    let fetch2 = b.const_fetch("ANSWER");
    let store2 = b.assign_var("b", fetch2);
    let s2 = b.expr_stmt(store2);
    let program = b.finish(vec![ns_app, decl, s1, ns_other, use_c, s2]);
    let r = run(&program);
    r.assert_complete();
    assert_int(&r, "a", 42);
    assert_int(&r, "b", 42);
}
