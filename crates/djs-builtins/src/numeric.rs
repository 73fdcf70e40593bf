//! `parseInt`/`Number` (§4.10, §8 "round-trip of literal numbers"):
//! the two top-level numeric coercion functions this catalog exposes,
//! each with deliberately different leniency.

use djs_value::{ObjectId, Value, to_display_string, to_number};
use djs_vm::NativeContext;

use crate::register_native;

pub(crate) fn install(entries: &mut Vec<djs_compiler::PreloadEntry>, registry: &mut djs_vm::NativeRegistry) {
    register_native(entries, registry, "parseInt", 1, parse_int);
    register_native(entries, registry, "Number", 1, number);
}

/// Leading whitespace trimmed, optional sign, longest leading run of
/// ASCII digits; `NaN` if that run is empty — deliberately permissive
/// about trailing garbage (`parseInt("15px") === 15`).
fn parse_int(ctx: &mut NativeContext, _own_pool: ObjectId, _argc: u32) -> bool {
    let s = to_display_string(ctx.heap(), &ctx.arg(0));
    let trimmed = s.trim_start();
    let chars: Vec<char> = trimmed.chars().collect();

    let mut i = 0;
    let mut negative = false;
    if let Some(&c) = chars.first() {
        if c == '+' || c == '-' {
            negative = c == '-';
            i = 1;
        }
    }
    let digits_start = i;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }

    if i == digits_start {
        ctx.set_result(Value::NaN);
        return true;
    }

    let digits: String = chars[digits_start..i].iter().collect();
    let magnitude: f64 = digits.parse().unwrap_or(f64::NAN);
    let signed = if negative { -magnitude } else { magnitude };
    ctx.set_result(int_or_float(signed));
    true
}

/// Mirror the compiler's own integral/float constant split (§4.2): a
/// whole-number result that fits `i32` stays an `Int`, everything else
/// becomes a `Float`.
fn int_or_float(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i32::MIN as f64 && n <= i32::MAX as f64 {
        Value::int(n as i32)
    } else {
        Value::float(n)
    }
}

/// Strict whole-string numeric parse: unlike `parseInt`, any trailing
/// non-numeric character makes the whole conversion `NaN`.
fn number(ctx: &mut NativeContext, _own_pool: ObjectId, argc: u32) -> bool {
    if argc == 0 {
        ctx.set_result(Value::int(0));
        return true;
    }
    let arg = ctx.arg(0);
    let string_bytes = match &arg {
        Value::Object(id) => ctx.heap().get(*id).and_then(|o| o.as_str()).map(|s| s.to_string()),
        _ => None,
    };
    match string_bytes {
        Some(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                ctx.set_result(Value::int(0));
            } else {
                match trimmed.parse::<f64>() {
                    Ok(n) => ctx.set_result(int_or_float(n)),
                    Err(_) => ctx.set_result(Value::NaN),
                }
            }
        }
        None => ctx.set_result(to_number(ctx.heap(), &arg)),
    }
    true
}
