//! # djs builtins
//!
//! The native-function catalog (§4.10): the external collaborator that
//! implements `console.log`, `Date.now`, `parseInt`/`Number`, and a
//! minimal set of `String`/`Array`/`Object` intrinsics against the
//! native contract `djs-vm` defines (`NativeFn`/`NativeContext`).
//!
//! [`catalog`] is the sole entry point: it returns the preload list a
//! host hands to `djs_compiler::compile` alongside the matching
//! `NativeRegistry` it hands to `djs_vm::Vm::boot`. Every native is
//! registered under the same name its preload entry resolves by, so the
//! two halves stay in lockstep by construction.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

mod array;
mod console;
mod date;
mod numeric;
mod object;
mod string;

use djs_compiler::PreloadEntry;
use djs_vm::NativeRegistry;

/// Build the full preload list and native registry this catalog
/// provides. Order matters: base-prototype placeholders and namespace
/// objects (`console`, `Date`, `Object`) must precede the `method(...)`
/// entries that hang off them (§4.1, "Preload & bootstrap").
pub fn catalog() -> (Vec<PreloadEntry>, NativeRegistry) {
    let mut registry = NativeRegistry::new();
    let mut entries = Vec::new();

    // Base prototype placeholders (§3, "base-prototypes") and the
    // canonical "length" key every array/string/function consults.
    for proto in ["Object::prototype", "Boolean::prototype", "Number::prototype", "String::prototype", "Array::prototype", "Function::prototype"] {
        entries.push(PreloadEntry::object(proto));
    }
    entries.push(PreloadEntry::key_string("length"));

    console::install(&mut entries, &mut registry);
    date::install(&mut entries, &mut registry);
    numeric::install(&mut entries, &mut registry);
    string::install(&mut entries, &mut registry);
    array::install(&mut entries, &mut registry);
    object::install(&mut entries, &mut registry);

    (entries, registry)
}

/// Register `f` under `name` in both the registry and as a fresh
/// preload entry, keeping the two in sync. Shared by every module in
/// this catalog.
fn register_native(
    entries: &mut Vec<PreloadEntry>,
    registry: &mut NativeRegistry,
    global_name: &str,
    arity: u32,
    f: djs_vm::NativeFn,
) {
    registry.register(global_name, f);
    entries.push(PreloadEntry::native(global_name, global_name, arity));
}

/// Register `f` under `native_name` and install it as `holder[key]`
/// rather than a flat global (`console.log`, `Array.prototype.push`, …).
fn register_method(
    entries: &mut Vec<PreloadEntry>,
    registry: &mut NativeRegistry,
    holder: &str,
    key: &str,
    native_name: &str,
    arity: u32,
    f: djs_vm::NativeFn,
) {
    registry.register(native_name, f);
    entries.push(PreloadEntry::method(holder, key, native_name, arity));
}
