//! `String.prototype` intrinsics (§4.10): `.length` is already synthetic
//! per §4.4, so this module covers everything else — `.charAt`,
//! `.indexOf`, `.slice`, `.split`, `.toUpperCase`/`.toLowerCase`.

use djs_value::{ObjectId, Value, to_display_string, to_number};
use djs_vm::NativeContext;

use crate::register_method;

pub(crate) fn install(entries: &mut Vec<djs_compiler::PreloadEntry>, registry: &mut djs_vm::NativeRegistry) {
    register_method(entries, registry, "String::prototype", "charAt", "String.prototype.charAt", 1, char_at);
    register_method(entries, registry, "String::prototype", "indexOf", "String.prototype.indexOf", 1, index_of);
    register_method(entries, registry, "String::prototype", "slice", "String.prototype.slice", 2, slice);
    register_method(entries, registry, "String::prototype", "split", "String.prototype.split", 1, split);
    register_method(entries, registry, "String::prototype", "toUpperCase", "String.prototype.toUpperCase", 0, to_upper_case);
    register_method(entries, registry, "String::prototype", "toLowerCase", "String.prototype.toLowerCase", 0, to_lower_case);
}

fn this_string(ctx: &NativeContext) -> String {
    match ctx.this() {
        Value::Object(id) => ctx.heap().get(id).and_then(|o| o.as_str()).map(|s| s.to_string()).unwrap_or_default(),
        other => to_display_string(ctx.heap(), &other),
    }
}

fn to_index(ctx: &NativeContext, v: &Value) -> i64 {
    match to_number(ctx.heap(), v) {
        Value::Int(i) => i as i64,
        Value::Float(f) => f as i64,
        _ => 0,
    }
}

/// Clamp a `slice(start, end)` pair the way ES5 does: negative indices
/// count from the end, out-of-range indices clamp to the bounds, and an
/// omitted `end` means "through the end of the string".
fn clamp_range(len: i64, start: i64, end: i64) -> (usize, usize) {
    let norm = |raw: i64| -> i64 {
        if raw < 0 { (len + raw).max(0) } else { raw.min(len) }
    };
    let start = norm(start);
    let end = norm(end).max(start);
    (start as usize, end as usize)
}

fn char_at(ctx: &mut NativeContext, _own_pool: ObjectId, _argc: u32) -> bool {
    let s = this_string(ctx);
    let idx = to_index(ctx, &ctx.arg(0));
    let result = if idx >= 0 {
        s.chars().nth(idx as usize).map(|c| c.to_string()).unwrap_or_default()
    } else {
        String::new()
    };
    alloc_string_result(ctx, result)
}

fn index_of(ctx: &mut NativeContext, _own_pool: ObjectId, _argc: u32) -> bool {
    let s = this_string(ctx);
    let needle = to_display_string(ctx.heap(), &ctx.arg(0));
    let result = match s.find(needle.as_str()) {
        Some(byte_idx) => s[..byte_idx].chars().count() as i32,
        None => -1,
    };
    ctx.set_result(Value::int(result));
    true
}

fn slice(ctx: &mut NativeContext, _own_pool: ObjectId, argc: u32) -> bool {
    let s = this_string(ctx);
    let len = s.chars().count() as i64;
    let start = to_index(ctx, &ctx.arg(0));
    let end = if argc < 2 { len } else { to_index(ctx, &ctx.arg(1)) };
    let (start, end) = clamp_range(len, start, end);
    let result: String = s.chars().skip(start).take(end.saturating_sub(start)).collect();
    alloc_string_result(ctx, result)
}

fn split(ctx: &mut NativeContext, _own_pool: ObjectId, argc: u32) -> bool {
    let s = this_string(ctx);
    let pieces: Vec<String> = if argc == 0 {
        vec![s]
    } else {
        let sep = to_display_string(ctx.heap(), &ctx.arg(0));
        if sep.is_empty() {
            s.chars().map(|c| c.to_string()).collect()
        } else {
            s.split(sep.as_str()).map(|p| p.to_string()).collect()
        }
    };

    let mut items = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match ctx.alloc_string(piece) {
            Some(id) => items.push(Value::Object(id)),
            None => {
                ctx.fail("heap exhausted allocating split piece");
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
            ctx.fail("heap exhausted allocating split result");
            false
        }
    }
}

fn to_upper_case(ctx: &mut NativeContext, _own_pool: ObjectId, _argc: u32) -> bool {
    let s = this_string(ctx).to_uppercase();
    alloc_string_result(ctx, s)
}

fn to_lower_case(ctx: &mut NativeContext, _own_pool: ObjectId, _argc: u32) -> bool {
    let s = this_string(ctx).to_lowercase();
    alloc_string_result(ctx, s)
}

fn alloc_string_result(ctx: &mut NativeContext, s: String) -> bool {
    match ctx.alloc_string(s) {
        Some(id) => {
            ctx.set_result(Value::Object(id));
            true
        }
        None => {
            ctx.fail("heap exhausted allocating string result");
            false
        }
    }
}
