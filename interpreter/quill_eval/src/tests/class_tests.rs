//! Classes: construction, inheritance, visibility, traits, statics,
//! magic methods, and declaration-time verification.

use pretty_assertions::assert_eq;

use quill_ir::{
    ClassRef, MethodDecl, Param, ProgramBuilder, TraitAdaptation, TraitDecl, TraitUse,
    Visibility,
};

use super::{assert_int, class_decl, method, prop, run};
use crate::signal::EvalErrorKind;
use crate::value::Value;

#[test]
fn construction_applies_defaults_and_constructor() {
    let mut b = ProgramBuilder::new();
    // class Point { public $x = 0; public $y = 0;
    //   function __construct($x) { $this->x = $x; } }
    let zero_x = b.int(0);
    let zero_y = b.int(0);
    let this = b.var("this");
    let prop_x = b.prop(this, "x");
    let arg_x = b.var("x");
    let set_x = b.assign(prop_x, arg_x);
    let ctor_body = b.expr_stmt(set_x);
    let ctor = b.func("__construct", vec![b.param("x")], vec![ctor_body], false);

    let mut decl = class_decl(&b, "Point");
    decl.props = vec![prop(&b, "x", Some(zero_x)), prop(&b, "y", Some(zero_y))];
    decl.methods = vec![method(ctor)];
    let cls = b.class(decl);

    let five = b.int(5);
    let arg = b.arg(five);
    let new = b.new_object(ClassRef::Named(b.name("Point")), vec![arg]);
    let store = b.assign_var("p", new);
    let s1 = b.expr_stmt(store);
    let p = b.var("p");
    let read_x = b.prop(p, "x");
    let store_x = b.assign_var("x", read_x);
    let s2 = b.expr_stmt(store_x);
    let p2 = b.var("p");
    let read_y = b.prop(p2, "y");
    let store_y = b.assign_var("y", read_y);
    let s3 = b.expr_stmt(store_y);

    let program = b.finish(vec![cls, s1, s2, s3]);
    let r = run(&program);
    r.assert_complete();
    assert_int(&r, "x", 5);
    assert_int(&r, "y", 0);
}

#[test]
fn constructor_promotion_declares_and_assigns_properties() {
    let mut b = ProgramBuilder::new();
    // class Box { function __construct(private $size) {}
    //   function size() { return $this->size; } }
    let mut size_param = Param::new(b.name("size"));
    size_param.promote = Some(Visibility::Private);
    let ctor = b.func("__construct", vec![size_param], vec![], false);
    let this = b.var("this");
    let size_prop = b.prop(this, "size");
    let ret = b.ret(Some(size_prop));
    let getter = b.func("size", vec![], vec![ret], false);

    let mut decl = class_decl(&b, "Box");
    decl.methods = vec![method(ctor), method(getter)];
    let cls = b.class(decl);

    let nine = b.int(9);
    let arg = b.arg(nine);
    let new = b.new_object(ClassRef::Named(b.name("Box")), vec![arg]);
    let store = b.assign_var("box", new);
    let s1 = b.expr_stmt(store);
    let box_var = b.var("box");
    let call = b.method_call(box_var, "size", vec![]);
    let store_size = b.assign_var("size", call);
    let s2 = b.expr_stmt(store_size);

    let program = b.finish(vec![cls, s1, s2]);
    let r = run(&program);
    r.assert_complete();
    assert_int(&r, "size", 9);
}

#[test]
fn promoted_private_property_is_invisible_outside() {
    let mut b = ProgramBuilder::new();
    let mut size_param = Param::new(b.name("size"));
    size_param.promote = Some(Visibility::Private);
    let ctor = b.func("__construct", vec![size_param], vec![], false);
    let mut decl = class_decl(&b, "Box");
    decl.methods = vec![method(ctor)];
    let cls = b.class(decl);

    let one = b.int(1);
    let arg = b.arg(one);
    let new = b.new_object(ClassRef::Named(b.name("Box")), vec![arg]);
    let store = b.assign_var("box", new);
    let s1 = b.expr_stmt(store);
    let box_var = b.var("box");
    let read = b.prop(box_var, "size");
    let leak = b.assign_var("leak", read);
    let s2 = b.expr_stmt(leak);

    let program = b.finish(vec![cls, s1, s2]);
    let r = run(&program);
    assert_eq!(r.expect_fatal().kind, EvalErrorKind::VisibilityViolation);
}

/// Base with a protected method; a subclass may call it, an unrelated
/// context may not.
fn protected_fixture(b: &mut ProgramBuilder) -> Vec<quill_ir::StmtId> {
    let secret_val = b.str("s");
    let ret = b.ret(Some(secret_val));
    let secret = b.func("secret", vec![], vec![ret], false);
    let mut secret_decl = method(secret);
    secret_decl.visibility = Visibility::Protected;
    let mut base = class_decl(b, "Base");
    base.methods = vec![secret_decl];
    let base_stmt = b.class(base);

    let this = b.var("this");
    let call = b.method_call(this, "secret", vec![]);
    let ret2 = b.ret(Some(call));
    let peek = b.func("peek", vec![], vec![ret2], false);
    let mut sub = class_decl(b, "Sub");
    sub.parent = Some(b.name("Base"));
    sub.methods = vec![method(peek)];
    let sub_stmt = b.class(sub);

    vec![base_stmt, sub_stmt]
}

#[test]
fn protected_method_reachable_from_subclass() {
    let mut b = ProgramBuilder::new();
    let mut stmts = protected_fixture(&mut b);
    let new = b.new_object(ClassRef::Named(b.name("Sub")), vec![]);
    let store = b.assign_var("obj", new);
    stmts.push(b.expr_stmt(store));
    let obj = b.var("obj");
    let call = b.method_call(obj, "peek", vec![]);
    let store_r = b.assign_var("r", call);
    stmts.push(b.expr_stmt(store_r));
    let program = b.finish(stmts);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("r"), Value::str("s"));
}

#[test]
fn protected_method_blocked_from_unrelated_context() {
    let mut b = ProgramBuilder::new();
    let mut stmts = protected_fixture(&mut b);
    let new = b.new_object(ClassRef::Named(b.name("Sub")), vec![]);
    let store = b.assign_var("obj", new);
    stmts.push(b.expr_stmt(store));
    // Top-level code has no class context.
    let obj = b.var("obj");
    let call = b.method_call(obj, "secret", vec![]);
    stmts.push(b.expr_stmt(call));
    let program = b.finish(stmts);
    let r = run(&program);
    assert_eq!(r.expect_fatal().kind, EvalErrorKind::VisibilityViolation);
}

#[test]
fn private_method_blocked_even_from_subclass() {
    let mut b = ProgramBuilder::new();
    let one = b.int(1);
    let ret = b.ret(Some(one));
    let hidden = b.func("hidden", vec![], vec![ret], false);
    let mut hidden_decl = method(hidden);
    hidden_decl.visibility = Visibility::Private;
    let mut base = class_decl(&b, "Base");
    base.methods = vec![hidden_decl];
    let base_stmt = b.class(base);

    let this = b.var("this");
    let call = b.method_call(this, "hidden", vec![]);
    let ret2 = b.ret(Some(call));
    let poke = b.func("poke", vec![], vec![ret2], false);
    let mut sub = class_decl(&b, "Sub");
    sub.parent = Some(b.name("Base"));
    sub.methods = vec![method(poke)];
    let sub_stmt = b.class(sub);

    let new = b.new_object(ClassRef::Named(b.name("Sub")), vec![]);
    let store = b.assign_var("obj", new);
    let s1 = b.expr_stmt(store);
    let obj = b.var("obj");
    let call2 = b.method_call(obj, "poke", vec![]);
    let s2 = b.expr_stmt(call2);

    let program = b.finish(vec![base_stmt, sub_stmt, s1, s2]);
    let r = run(&program);
    assert_eq!(r.expect_fatal().kind, EvalErrorKind::VisibilityViolation);
}

#[test]
fn parent_call_keeps_this_and_dispatches_statically() {
    let mut b = ProgramBuilder::new();
    // class A { function describe() { return "A:" . $this->tag; } }
    let this = b.var("this");
    let tag = b.prop(this, "tag");
    let prefix = b.str("A:");
    let concat = b.binary(quill_ir::BinaryOp::Concat, prefix, tag);
    let ret = b.ret(Some(concat));
    let describe_a = b.func("describe", vec![], vec![ret], false);
    let tag_default = b.str("t");
    let mut a = class_decl(&b, "A");
    a.props = vec![prop(&b, "tag", Some(tag_default))];
    a.methods = vec![method(describe_a)];
    let a_stmt = b.class(a);

    // class B extends A { function describe() {
    //   return "B+" . parent::describe(); } }
    let parent_call = b.static_call(ClassRef::Parent, "describe", vec![]);
    let prefix_b = b.str("B+");
    let concat_b = b.binary(quill_ir::BinaryOp::Concat, prefix_b, parent_call);
    let ret_b = b.ret(Some(concat_b));
    let describe_b = b.func("describe", vec![], vec![ret_b], false);
    let mut bb = class_decl(&b, "B");
    bb.parent = Some(b.name("A"));
    bb.methods = vec![method(describe_b)];
    let b_stmt = b.class(bb);

    let new = b.new_object(ClassRef::Named(b.name("B")), vec![]);
    let store = b.assign_var("obj", new);
    let s1 = b.expr_stmt(store);
    let obj = b.var("obj");
    let call = b.method_call(obj, "describe", vec![]);
    let store_r = b.assign_var("r", call);
    let s2 = b.expr_stmt(store_r);

    let program = b.finish(vec![a_stmt, b_stmt, s1, s2]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("r"), Value::str("B+A:t"));
}

#[test]
fn abstract_method_must_be_implemented_at_declaration() {
    let mut b = ProgramBuilder::new();
    let runner = b.func("run", vec![], vec![], false);
    let mut run_decl = method(runner);
    run_decl.is_abstract = true;
    let mut base = class_decl(&b, "Base");
    base.is_abstract = true;
    base.methods = vec![run_decl];
    let base_stmt = b.class(base);

    // Concrete subclass without an override: the DECLARATION fails,
    // there is no instantiation in this program at all.
    let mut broken = class_decl(&b, "Broken");
    broken.parent = Some(b.name("Base"));
    let broken_stmt = b.class(broken);

    let program = b.finish(vec![base_stmt, broken_stmt]);
    let r = run(&program);
    assert_eq!(r.expect_fatal().kind, EvalErrorKind::InvalidDeclaration);
}

#[test]
fn abstract_class_cannot_be_instantiated() {
    let mut b = ProgramBuilder::new();
    let mut base = class_decl(&b, "Base");
    base.is_abstract = true;
    let base_stmt = b.class(base);
    let new = b.new_object(ClassRef::Named(b.name("Base")), vec![]);
    let s = b.expr_stmt(new);
    let program = b.finish(vec![base_stmt, s]);
    let r = run(&program);
    assert_eq!(r.expect_fatal().kind, EvalErrorKind::InvalidDeclaration);
}

#[test]
fn interface_obligations_checked_at_declaration() {
    let mut b = ProgramBuilder::new();
    // interface Shape { function area(); }
    let area_sig = b.func("area", vec![], vec![], false);
    let mut area_decl = method(area_sig);
    area_decl.is_abstract = true;
    let iface = b.interface(quill_ir::InterfaceDecl {
        name: b.name("Shape"),
        extends: Vec::new(),
        consts: Vec::new(),
        methods: vec![area_decl],
        span: quill_ir::Span::DUMMY,
    });

    // class Blob implements Shape {}  — missing area()
    let mut blob = class_decl(&b, "Blob");
    blob.interfaces = vec![b.name("Shape")];
    let blob_stmt = b.class(blob);

    let program = b.finish(vec![iface, blob_stmt]);
    let r = run(&program);
    assert_eq!(r.expect_fatal().kind, EvalErrorKind::InvalidDeclaration);
}

#[test]
fn final_method_cannot_be_overridden() {
    let mut b = ProgramBuilder::new();
    let sealed = b.func("seal", vec![], vec![], false);
    let mut sealed_decl = method(sealed);
    sealed_decl.is_final = true;
    let mut base = class_decl(&b, "Base");
    base.methods = vec![sealed_decl];
    let base_stmt = b.class(base);

    let unsealed = b.func("seal", vec![], vec![], false);
    let mut sub = class_decl(&b, "Sub");
    sub.parent = Some(b.name("Base"));
    sub.methods = vec![method(unsealed)];
    let sub_stmt = b.class(sub);

    let program = b.finish(vec![base_stmt, sub_stmt]);
    let r = run(&program);
    assert_eq!(r.expect_fatal().kind, EvalErrorKind::InvalidDeclaration);
}

#[test]
fn trait_composition_with_insteadof_and_alias() {
    let mut b = ProgramBuilder::new();
    // trait Hello { function greet() { return "hello"; } }
    let hello_val = b.str("hello");
    let ret_h = b.ret(Some(hello_val));
    let greet_h = b.func("greet", vec![], vec![ret_h], false);
    let hello = b.trait_stmt(TraitDecl {
        name: b.name("Hello"),
        props: Vec::new(),
        methods: vec![method(greet_h)],
        span: quill_ir::Span::DUMMY,
    });
    // trait World { function greet() { return "world"; } }
    let world_val = b.str("world");
    let ret_w = b.ret(Some(world_val));
    let greet_w = b.func("greet", vec![], vec![ret_w], false);
    let world = b.trait_stmt(TraitDecl {
        name: b.name("World"),
        props: Vec::new(),
        methods: vec![method(greet_w)],
        span: quill_ir::Span::DUMMY,
    });

    // class Greeter { use Hello, World {
    //     Hello::greet insteadof World;
    //     World::greet as worldGreet; } }
    let mut greeter = class_decl(&b, "Greeter");
    greeter.uses = vec![
        TraitUse {
            name: b.name("Hello"),
            adaptations: vec![TraitAdaptation::InsteadOf {
                method: b.name("greet"),
                winner: b.name("Hello"),
            }],
        },
        TraitUse {
            name: b.name("World"),
            adaptations: vec![TraitAdaptation::Alias {
                method: b.name("greet"),
                from: Some(b.name("World")),
                alias: b.name("worldGreet"),
                visibility: None,
            }],
        },
    ];
    let greeter_stmt = b.class(greeter);

    let new = b.new_object(ClassRef::Named(b.name("Greeter")), vec![]);
    let store = b.assign_var("g", new);
    let s1 = b.expr_stmt(store);
    let g1 = b.var("g");
    let call1 = b.method_call(g1, "greet", vec![]);
    let store1 = b.assign_var("a", call1);
    let s2 = b.expr_stmt(store1);
    let g2 = b.var("g");
    let call2 = b.method_call(g2, "worldGreet", vec![]);
    let store2 = b.assign_var("b", call2);
    let s3 = b.expr_stmt(store2);

    let program = b.finish(vec![hello, world, greeter_stmt, s1, s2, s3]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("a"), Value::str("hello"));
    assert_eq!(r.global("b"), Value::str("world"));
}

#[test]
fn static_property_shared_through_self() {
    let mut b = ProgramBuilder::new();
    // class Counter { public static $count = 0;
    //   static function bump() { self::$count = self::$count + 1; } }
    let zero = b.int(0);
    let mut count_prop = prop(&b, "count", Some(zero));
    count_prop.is_static = true;
    let read = b.static_prop(ClassRef::SelfRef, "count");
    let one = b.int(1);
    let sum = b.binary(quill_ir::BinaryOp::Add, read, one);
    let target = b.static_prop(ClassRef::SelfRef, "count");
    let write = b.assign(target, sum);
    let body = b.expr_stmt(write);
    let bump = b.func("bump", vec![], vec![body], false);
    let mut bump_decl = method(bump);
    bump_decl.is_static = true;

    let mut counter = class_decl(&b, "Counter");
    counter.props = vec![count_prop];
    counter.methods = vec![bump_decl];
    let cls = b.class(counter);

    let call1 = b.static_call(ClassRef::Named(b.name("Counter")), "bump", vec![]);
    let s1 = b.expr_stmt(call1);
    let call2 = b.static_call(ClassRef::Named(b.name("Counter")), "bump", vec![]);
    let s2 = b.expr_stmt(call2);
    let read_out = b.static_prop(ClassRef::Named(b.name("Counter")), "count");
    let store = b.assign_var("n", read_out);
    let s3 = b.expr_stmt(store);

    let program = b.finish(vec![cls, s1, s2, s3]);
    let r = run(&program);
    r.assert_complete();
    assert_int(&r, "n", 2);
}

#[test]
fn late_static_binding_instantiates_the_called_class() {
    let mut b = ProgramBuilder::new();
    // class A { static function create() { return new static(); } }
    let new_static = b.new_object(ClassRef::Static, vec![]);
    let ret = b.ret(Some(new_static));
    let create = b.func("create", vec![], vec![ret], false);
    let mut create_decl = method(create);
    create_decl.is_static = true;
    let mut a = class_decl(&b, "A");
    a.methods = vec![create_decl];
    let a_stmt = b.class(a);

    // class B extends A {}
    let mut bb = class_decl(&b, "B");
    bb.parent = Some(b.name("A"));
    let b_stmt = b.class(bb);

    let call = b.static_call(ClassRef::Named(b.name("B")), "create", vec![]);
    let store = b.assign_var("obj", call);
    let s1 = b.expr_stmt(store);
    let obj = b.var("obj");
    let arg = b.arg(obj);
    let get_class = b.call("get_class", vec![arg]);
    let store_name = b.assign_var("name", get_class);
    let s2 = b.expr_stmt(store_name);

    let program = b.finish(vec![a_stmt, b_stmt, s1, s2]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("name"), Value::str("B"));
}

#[test]
fn magic_get_set_cover_undeclared_properties() {
    let mut b = ProgramBuilder::new();
    // class Bag { private $data = [];
    //   function __get($n) { return $this->data[$n]; }
    //   function __set($n, $v) { $this->data[$n] = $v; } }
    let empty = b.array(vec![]);
    let mut data_prop = prop(&b, "data", Some(empty));
    data_prop.visibility = Visibility::Private;

    let this1 = b.var("this");
    let data1 = b.prop(this1, "data");
    let n1 = b.var("n");
    let elem = b.index(data1, Some(n1));
    let ret_get = b.ret(Some(elem));
    let get = b.func("__get", vec![b.param("n")], vec![ret_get], false);

    let this2 = b.var("this");
    let data2 = b.prop(this2, "data");
    let n2 = b.var("n");
    let target = b.index(data2, Some(n2));
    let v = b.var("v");
    let write = b.assign(target, v);
    let set_body = b.expr_stmt(write);
    let set = b.func("__set", vec![b.param("n"), b.param("v")], vec![set_body], false);

    let mut bag = class_decl(&b, "Bag");
    bag.props = vec![data_prop];
    bag.methods = vec![method(get), method(set)];
    let cls = b.class(bag);

    let new = b.new_object(ClassRef::Named(b.name("Bag")), vec![]);
    let store = b.assign_var("bag", new);
    let s1 = b.expr_stmt(store);
    // $bag->color = "red";  — goes through __set
    let bag1 = b.var("bag");
    let color = b.prop(bag1, "color");
    let red = b.str("red");
    let assign = b.assign(color, red);
    let s2 = b.expr_stmt(assign);
    // $c = $bag->color;  — goes through __get
    let bag2 = b.var("bag");
    let color2 = b.prop(bag2, "color");
    let store_c = b.assign_var("c", color2);
    let s3 = b.expr_stmt(store_c);

    let program = b.finish(vec![cls, s1, s2, s3]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("c"), Value::str("red"));
}

#[test]
fn magic_call_absorbs_undefined_methods() {
    let mut b = ProgramBuilder::new();
    // class Proxy { function __call($name, $args) {
    //   return $name . ":" . count($args); } }
    let name_var = b.var("name");
    let colon = b.str(":");
    let with_colon = b.binary(quill_ir::BinaryOp::Concat, name_var, colon);
    let args_var = b.var("args");
    let count_arg = b.arg(args_var);
    let count = b.call("count", vec![count_arg]);
    let joined = b.binary(quill_ir::BinaryOp::Concat, with_colon, count);
    let ret = b.ret(Some(joined));
    let call_hook = b.func(
        "__call",
        vec![b.param("name"), b.param("args")],
        vec![ret],
        false,
    );
    let mut proxy = class_decl(&b, "Proxy");
    proxy.methods = vec![method(call_hook)];
    let cls = b.class(proxy);

    let new = b.new_object(ClassRef::Named(b.name("Proxy")), vec![]);
    let store = b.assign_var("p", new);
    let s1 = b.expr_stmt(store);
    let p = b.var("p");
    let one = b.int(1);
    let two = b.int(2);
    let a1 = b.arg(one);
    let a2 = b.arg(two);
    let call = b.method_call(p, "anything", vec![a1, a2]);
    let store_r = b.assign_var("r", call);
    let s2 = b.expr_stmt(store_r);

    let program = b.finish(vec![cls, s1, s2]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("r"), Value::str("anything:2"));
}

#[test]
fn to_string_drives_echo_and_concat() {
    let mut b = ProgramBuilder::new();
    let text = b.str("widget");
    let ret = b.ret(Some(text));
    let to_string = b.func("__toString", vec![], vec![ret], false);
    let mut widget = class_decl(&b, "Widget");
    widget.methods = vec![method(to_string)];
    let cls = b.class(widget);

    let new = b.new_object(ClassRef::Named(b.name("Widget")), vec![]);
    let store = b.assign_var("w", new);
    let s1 = b.expr_stmt(store);
    let w = b.var("w");
    let echo = b.echo(vec![w]);

    let program = b.finish(vec![cls, s1, echo]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.output(), "widget");
}

#[test]
fn clone_copies_shallowly_and_calls_hook() {
    let mut b = ProgramBuilder::new();
    // class Node { public $n = 1; public $cloned = 0;
    //   function __clone() { $this->cloned = 1; } }
    let one = b.int(1);
    let zero = b.int(0);
    let this = b.var("this");
    let cloned_prop = b.prop(this, "cloned");
    let one2 = b.int(1);
    let mark = b.assign(cloned_prop, one2);
    let hook_body = b.expr_stmt(mark);
    let hook = b.func("__clone", vec![], vec![hook_body], false);
    let mut node = class_decl(&b, "Node");
    node.props = vec![prop(&b, "n", Some(one)), prop(&b, "cloned", Some(zero))];
    node.methods = vec![method(hook)];
    let cls = b.class(node);

    let new = b.new_object(ClassRef::Named(b.name("Node")), vec![]);
    let store = b.assign_var("a", new);
    let s1 = b.expr_stmt(store);
    let a = b.var("a");
    let cloned = b.clone_expr(a);
    let store_b = b.assign_var("b", cloned);
    let s2 = b.expr_stmt(store_b);
    // Mutating the copy leaves the original alone.
    let b_var = b.var("b");
    let n_prop = b.prop(b_var, "n");
    let ninety = b.int(90);
    let set_n = b.assign(n_prop, ninety);
    let s3 = b.expr_stmt(set_n);
    let a2 = b.var("a");
    let orig_n = b.prop(a2, "n");
    let store_orig = b.assign_var("orig", orig_n);
    let s4 = b.expr_stmt(store_orig);
    let b2 = b.var("b");
    let cloned_flag = b.prop(b2, "cloned");
    let store_flag = b.assign_var("flag", cloned_flag);
    let s5 = b.expr_stmt(store_flag);

    let program = b.finish(vec![cls, s1, s2, s3, s4, s5]);
    let r = run(&program);
    r.assert_complete();
    assert_int(&r, "orig", 1);
    assert_int(&r, "flag", 1);
}

#[test]
fn instanceof_walks_parents_and_interfaces() {
    let mut b = ProgramBuilder::new();
    let area_sig = b.func("area", vec![], vec![], false);
    let mut area_decl = method(area_sig);
    area_decl.is_abstract = true;
    let iface = b.interface(quill_ir::InterfaceDecl {
        name: b.name("Shape"),
        extends: Vec::new(),
        consts: Vec::new(),
        methods: vec![area_decl],
        span: quill_ir::Span::DUMMY,
    });
    let one = b.int(1);
    let ret = b.ret(Some(one));
    let area = b.func("area", vec![], vec![ret], false);
    let mut circle = class_decl(&b, "Circle");
    circle.interfaces = vec![b.name("Shape")];
    circle.methods = vec![method(area)];
    let circle_stmt = b.class(circle);
    let mut disc = class_decl(&b, "Disc");
    disc.parent = Some(b.name("Circle"));
    let disc_stmt = b.class(disc);

    let new = b.new_object(ClassRef::Named(b.name("Disc")), vec![]);
    let store = b.assign_var("d", new);
    let s1 = b.expr_stmt(store);
    let d1 = b.var("d");
    let is_circle = b.instance_of(d1, ClassRef::Named(b.name("Circle")));
    let store1 = b.assign_var("is_circle", is_circle);
    let s2 = b.expr_stmt(store1);
    let d2 = b.var("d");
    let is_shape = b.instance_of(d2, ClassRef::Named(b.name("Shape")));
    let store2 = b.assign_var("is_shape", is_shape);
    let s3 = b.expr_stmt(store2);
    let d3 = b.var("d");
    let is_other = b.instance_of(d3, ClassRef::Named(b.name("Elsewhere")));
    let store3 = b.assign_var("is_other", is_other);
    let s4 = b.expr_stmt(store3);

    let program = b.finish(vec![iface, circle_stmt, disc_stmt, s1, s2, s3, s4]);
    let r = run(&program);
    r.assert_complete();
    assert_eq!(r.global("is_circle"), Value::bool(true));
    assert_eq!(r.global("is_shape"), Value::bool(true));
    assert_eq!(r.global("is_other"), Value::bool(false));
}

#[test]
fn class_constants_resolve_and_inherit() {
    let mut b = ProgramBuilder::new();
    let three = b.int(3);
    let mut base = class_decl(&b, "Config");
    base.consts = vec![quill_ir::ClassConstDecl {
        name: b.name("LIMIT"),
        value: three,
    }];
    let base_stmt = b.class(base);
    let mut sub = class_decl(&b, "Derived");
    sub.parent = Some(b.name("Config"));
    let sub_stmt = b.class(sub);

    let read = b.class_const(ClassRef::Named(b.name("Derived")), "LIMIT");
    let store = b.assign_var("limit", read);
    let s = b.expr_stmt(store);
    let program = b.finish(vec![base_stmt, sub_stmt, s]);
    let r = run(&program);
    r.assert_complete();
    assert_int(&r, "limit", 3);
}

#[test]
fn method_decl_shorthand_defaults_are_public_instance() {
    let decl = MethodDecl {
        func: quill_ir::FuncId::new(0),
        visibility: Visibility::Public,
        is_static: false,
        is_abstract: false,
        is_final: false,
    };
    assert_eq!(decl.visibility, Visibility::Public);
    assert!(!decl.is_static);
}
