//! Full-pipeline scenarios that need the native catalog: parse, compile
//! against [`djs_builtins::catalog`]'s preload list, boot, and run.

use djs_ast::{SourceId, TranslationUnit};
use djs_value::{to_display_string, Value};
use djs_vm::{Vm, VmConfig, VmStatus};

fn run(source: &str) -> Vm {
    let unit = djs_parser::parse_source(source, SourceId(0), "test.js").expect("parse");
    let (preload, registry) = djs_builtins::catalog();
    let program = djs_compiler::compile(&TranslationUnit::single(unit), &preload).expect("compile");
    let mut vm = Vm::boot(program, VmConfig::default(), registry).expect("boot");
    let status = vm.run();
    assert_eq!(status, VmStatus::Ok, "unexpected halt status");
    vm
}

#[test]
fn parse_int_arithmetic_and_failure() {
    let vm = run(r#"var r = parseInt("15") + parseInt("69"); var bad = parseInt("foo");"#);
    assert_eq!(vm.read_global("r"), Some(Value::int(84)));
    assert_eq!(vm.read_global("bad"), Some(Value::NaN));
}

#[test]
fn number_strict_parse() {
    let vm = run(r#"var r = Number("5");"#);
    assert_eq!(vm.read_global("r"), Some(Value::int(5)));
}

#[test]
fn array_push_and_join() {
    let vm = run(r#"var a = [1, 2]; a.push(3); a.push(4); var r = a.join("-");"#);
    let r = vm.read_global("r").expect("r bound");
    assert_eq!(to_display_string(vm.heap(), &r), "1-2-3-4");
}

#[test]
fn array_index_of_and_slice() {
    let vm = run(
        r#"
        var a = [10, 20, 30, 40];
        var idx = a.indexOf(30);
        var tail = a.slice(1, 3).join(",");
        "#,
    );
    assert_eq!(vm.read_global("idx"), Some(Value::int(2)));
    let tail = vm.read_global("tail").expect("tail bound");
    assert_eq!(to_display_string(vm.heap(), &tail), "20,30");
}

#[test]
fn string_prototype_methods() {
    let vm = run(
        r#"
        var s = "Hello World";
        var upper = s.toUpperCase();
        var idx = s.indexOf("World");
        var piece = s.slice(0, 5);
        "#,
    );
    let upper = vm.read_global("upper").unwrap();
    assert_eq!(to_display_string(vm.heap(), &upper), "HELLO WORLD");
    assert_eq!(vm.read_global("idx"), Some(Value::int(6)));
    let piece = vm.read_global("piece").unwrap();
    assert_eq!(to_display_string(vm.heap(), &piece), "Hello");
}

#[test]
fn object_create_keys_and_freeze() {
    let vm = run(
        r#"
        var base = {x: 1};
        var child = Object.create(base);
        child.y = 2;
        var frozen = Object.freeze(child);
        frozen.y = 99;
        var r = frozen.y;
        "#,
    );
    assert_eq!(vm.read_global("r"), Some(Value::int(2)));
}

#[test]
fn console_log_does_not_abort_a_run() {
    let vm = run(r#"console.log("hi", 1, true); var r = 1;"#);
    assert_eq!(vm.read_global("r"), Some(Value::int(1)));
}

#[test]
fn date_now_returns_a_number() {
    let vm = run("var r = Date.now();");
    let r = vm.read_global("r").unwrap();
    assert!(matches!(r, Value::Int(_) | Value::Float(_)));
}
