//! `Array.prototype` intrinsics (§4.10): `.push`, `.pop`, `.join`,
//! `.indexOf`, `.slice` — exactly enough to realize end-to-end scenario
//! 5 (`a.push(3); a.push(4); a.join("-")`).

use djs_value::{ObjectId, Value, strict_equals, to_display_string, to_number};
use djs_vm::NativeContext;

use crate::register_method;

pub(crate) fn install(entries: &mut Vec<djs_compiler::PreloadEntry>, registry: &mut djs_vm::NativeRegistry) {
    register_method(entries, registry, "Array::prototype", "push", "Array.prototype.push", 1, push);
    register_method(entries, registry, "Array::prototype", "pop", "Array.prototype.pop", 0, pop);
    register_method(entries, registry, "Array::prototype", "join", "Array.prototype.join", 1, join);
    register_method(entries, registry, "Array::prototype", "indexOf", "Array.prototype.indexOf", 1, index_of);
    register_method(entries, registry, "Array::prototype", "slice", "Array.prototype.slice", 2, slice);
}

fn this_id(ctx: &mut NativeContext, who: &'static str) -> Option<ObjectId> {
    match ctx.this() {
        Value::Object(id) => Some(id),
        _ => {
            ctx.fail(format!("{who} called on a non-array"));
            None
        }
    }
}

fn to_index(ctx: &NativeContext, v: &Value) -> i64 {
    match to_number(ctx.heap(), v) {
        Value::Int(i) => i as i64,
        Value::Float(f) => f as i64,
        _ => 0,
    }
}

fn push(ctx: &mut NativeContext, _own_pool: ObjectId, argc: u32) -> bool {
    let Some(id) = this_id(ctx, "push") else { return false };
    let args: Vec<Value> = (0..argc as usize).map(|i| ctx.arg(i)).collect();
    let len = {
        let obj = match ctx.heap_mut().get_mut(id) {
            Some(obj) => obj,
            None => {
                ctx.fail("dangling array handle");
                return false;
            }
        };
        let items = match obj.sequential_items_mut() {
            Some(items) => items,
            None => {
                ctx.fail("push called on a non-array");
                return false;
            }
        };
        items.extend(args);
        items.len() as i32
    };
    ctx.set_result(Value::int(len));
    true
}

fn pop(ctx: &mut NativeContext, _own_pool: ObjectId, _argc: u32) -> bool {
    let Some(id) = this_id(ctx, "pop") else { return false };
    let popped = {
        let obj = match ctx.heap_mut().get_mut(id) {
            Some(obj) => obj,
            None => {
                ctx.fail("dangling array handle");
                return false;
            }
        };
        match obj.sequential_items_mut() {
            Some(items) => items.pop().unwrap_or(Value::Undefined),
            None => {
                ctx.fail("pop called on a non-array");
                return false;
            }
        }
    };
    ctx.set_result(popped);
    true
}

fn join(ctx: &mut NativeContext, _own_pool: ObjectId, argc: u32) -> bool {
    let Some(id) = this_id(ctx, "join") else { return false };
    let sep = if argc == 0 { ",".to_string() } else { to_display_string(ctx.heap(), &ctx.arg(0)) };
    let items: Vec<Value> = match ctx.heap().get(id).and_then(|o| o.sequential_items()) {
        Some(items) => items.to_vec(),
        None => {
            ctx.fail("join called on a non-array");
            return false;
        }
    };
    let joined = items
        .iter()
        .map(|v| to_display_string(ctx.heap(), v))
        .collect::<Vec<_>>()
        .join(&sep);
    match ctx.alloc_string(joined) {
        Some(id) => {
            ctx.set_result(Value::Object(id));
            true
        }
        None => {
            ctx.fail("heap exhausted allocating join result");
            false
        }
    }
}

fn index_of(ctx: &mut NativeContext, _own_pool: ObjectId, _argc: u32) -> bool {
    let Some(id) = this_id(ctx, "indexOf") else { return false };
    let target = ctx.arg(0);
    let items: Vec<Value> = match ctx.heap().get(id).and_then(|o| o.sequential_items()) {
        Some(items) => items.to_vec(),
        None => {
            ctx.fail("indexOf called on a non-array");
            return false;
        }
    };
    let found = items.iter().position(|v| strict_equals(ctx.heap(), v, &target));
    ctx.set_result(Value::int(found.map(|i| i as i32).unwrap_or(-1)));
    true
}

fn slice(ctx: &mut NativeContext, _own_pool: ObjectId, argc: u32) -> bool {
    let Some(id) = this_id(ctx, "slice") else { return false };
    let items: Vec<Value> = match ctx.heap().get(id).and_then(|o| o.sequential_items()) {
        Some(items) => items.to_vec(),
        None => {
            ctx.fail("slice called on a non-array");
            return false;
        }
    };
    let len = items.len() as i64;
    let start = to_index(ctx, &ctx.arg(0));
    let end = if argc < 2 { len } else { to_index(ctx, &ctx.arg(1)) };
    let norm = |raw: i64| -> i64 {
        if raw < 0 { (len + raw).max(0) } else { raw.min(len) }
    };
    let start = norm(start).max(0) as usize;
    let end = norm(end).max(start as i64) as usize;
    let sliced = items.get(start..end).map(|s| s.to_vec()).unwrap_or_default();
    match ctx.alloc_array(sliced) {
        Some(id) => {
            ctx.set_result(Value::Object(id));
            true
        }
        None => {
            ctx.fail("heap exhausted allocating slice result");
            false
        }
    }
}
