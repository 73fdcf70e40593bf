//! End-to-end scenarios that exercise the compiler and VM together
//! without any host-supplied natives — the subset of the acceptance
//! scenarios that needs nothing beyond bare ES5 control flow, closures,
//! and exceptions.

use djs_ast::{SourceId, TranslationUnit};
use djs_value::{to_display_string, Value};
use djs_vm::{Vm, VmConfig, VmStatus};

fn run(source: &str) -> Vm {
    let unit = djs_parser::parse_source(source, SourceId(0), "test.js").expect("parse");
    let program = djs_compiler::compile(&TranslationUnit::single(unit), &[]).expect("compile");
    let registry = djs_vm::NativeRegistry::new();
    let mut vm = Vm::boot(program, VmConfig::default(), registry).expect("boot");
    let status = vm.run();
    assert_eq!(status, VmStatus::Ok, "unexpected halt status");
    vm
}

#[test]
fn gaussian_sum() {
    let vm = run("function s(n){var c=n; var t=0; while(c>0){t=t+c;c=c-1;} return t;} var r = s(10);");
    assert_eq!(vm.read_global("r"), Some(Value::int(55)));
}

#[test]
fn recursive_fibonacci() {
    let vm = run("function f(n){ if (n<2) return n; return f(n-1)+f(n-2);} var r = f(30);");
    assert_eq!(vm.read_global("r"), Some(Value::int(832040)));
}

#[test]
fn try_throw_catch_recovers_the_thrown_value() {
    let vm = run(r#"var r; try { throw "boom"; } catch(e) { r = e; }"#);
    let r = vm.read_global("r").expect("r bound");
    assert_eq!(to_display_string(vm.heap(), &r), "boom");
}

#[test]
fn uncaught_throw_halts_with_unhandled_exception() {
    let unit = djs_parser::parse_source("throw 1;", SourceId(0), "test.js").unwrap();
    let program = djs_compiler::compile(&TranslationUnit::single(unit), &[]).unwrap();
    let mut vm = Vm::boot(program, VmConfig::default(), djs_vm::NativeRegistry::new()).unwrap();
    assert_eq!(vm.run(), VmStatus::UnhandledException);
    assert_eq!(vm.uncaught_exception(), Some("1"));
}

#[test]
fn hoisted_var_reads_undefined_not_an_error() {
    let vm = run("var before = later; var later = 5;");
    assert_eq!(vm.read_global("before"), Some(Value::Undefined));
    assert_eq!(vm.read_global("later"), Some(Value::int(5)));
}

#[test]
fn closures_observe_the_latest_assignment_in_the_enclosing_scope() {
    let vm = run(
        r#"
        function makeCounter() {
            var count = 0;
            return function () { count = count + 1; return count; };
        }
        var counter = makeCounter();
        counter();
        counter();
        var r = counter();
        "#,
    );
    assert_eq!(vm.read_global("r"), Some(Value::int(3)));
}

#[test]
fn object_literal_method_mutates_this_across_calls() {
    let vm = run(
        r#"
        var o = {x: 1, inc: function () { this.x = this.x + 1; return this.x; }};
        var a = o.inc();
        var b = o.inc();
        "#,
    );
    assert_eq!(vm.read_global("a"), Some(Value::int(2)));
    assert_eq!(vm.read_global("b"), Some(Value::int(3)));
}
