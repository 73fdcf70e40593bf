//! `Object.create`/`Object.keys`/`Object.freeze` (§4.10): surfaces the
//! object model's existing prototype-linking, property-pool iteration,
//! and `freeze` operation through script-visible natives.

use djs_value::{Object, ObjectId, Value};
use djs_vm::NativeContext;

use crate::register_method;

pub(crate) fn install(entries: &mut Vec<djs_compiler::PreloadEntry>, registry: &mut djs_vm::NativeRegistry) {
    entries.push(djs_compiler::PreloadEntry::object("Object"));
    register_method(entries, registry, "Object", "create", "Object.create", 1, create);
    register_method(entries, registry, "Object", "keys", "Object.keys", 1, keys);
    register_method(entries, registry, "Object", "freeze", "Object.freeze", 1, freeze);
}

fn create(ctx: &mut NativeContext, _own_pool: ObjectId, _argc: u32) -> bool {
    let proto = match ctx.arg(0) {
        Value::Object(id) => Some(id),
        Value::Null => None,
        _ => {
            ctx.fail("Object.create expects an object or null prototype");
            return false;
        }
    };
    match ctx.heap_mut().add(Object::plain(proto)) {
        Ok(id) => {
            ctx.set_result(Value::Object(id));
            true
        }
        Err(_) => {
            ctx.fail("heap exhausted in Object.create");
            false
        }
    }
}

fn keys(ctx: &mut NativeContext, _own_pool: ObjectId, _argc: u32) -> bool {
    let id = match ctx.arg(0) {
        Value::Object(id) => id,
        _ => {
            ctx.fail("Object.keys expects an object");
            return false;
        }
    };
    let key_strings: Vec<String> = match ctx.heap().get(id) {
        Some(obj) => obj
            .header()
            .properties
            .iter()
            .filter(|(_, slot)| slot.enumerable)
            .map(|(k, _)| k.as_str().to_string())
            .collect(),
        None => {
            ctx.fail("dangling object handle passed to Object.keys");
            return false;
        }
    };

    let mut items = Vec::with_capacity(key_strings.len());
    for key in key_strings {
        match ctx.alloc_string(key) {
            Some(id) => items.push(Value::Object(id)),
            None => {
                ctx.fail("heap exhausted in Object.keys");
                return false;
            }
        }
    }
    match ctx.alloc_array(items) {
        Some(id) => {
            ctx.set_result(Value::Object(id));
            true
        }
        None => {
            ctx.fail("heap exhausted in Object.keys");
            false
        }
    }
}

fn freeze(ctx: &mut NativeContext, _own_pool: ObjectId, _argc: u32) -> bool {
    let arg = ctx.arg(0);
    if let Value::Object(id) = arg {
        if let Some(obj) = ctx.heap_mut().get_mut(id) {
            obj.freeze();
        }
    }
    ctx.set_result(arg);
    true
}
