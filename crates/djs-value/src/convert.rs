//! Abstract conversions and operators over [`Value`] (§4.2).

use djs_gc::Heap;

use crate::object::Object;
use crate::value::Value;

/// `ToNumber`. `undefined` converts to `NaN`; `null` to `0`; booleans to
/// `1`/`0`; objects other than boxed numerics convert to `NaN`.
pub fn to_number(heap: &Heap<Object>, value: &Value) -> Value {
    match value {
        Value::Undefined | Value::NaN => Value::NaN,
        Value::Null => Value::int(0),
        Value::Bool(b) => Value::int(if *b { 1 } else { 0 }),
        Value::Int(_) | Value::Float(_) => value.clone(),
        Value::Object(id) => match heap.get(*id) {
            Some(Object::BoolBox(b)) => Value::int(if b.boolean { 1 } else { 0 }),
            Some(Object::Str(s)) => match s.bytes.trim().parse::<f64>() {
                Ok(n) => Value::float(n),
                Err(_) => Value::NaN,
            },
            _ => Value::NaN,
        },
        Value::Ref(_) | Value::ProtoKey => Value::NaN,
    }
}

/// `f64` view of a value's numeric conversion, for use in arithmetic.
fn as_f64(heap: &Heap<Object>, value: &Value) -> f64 {
    match to_number(heap, value) {
        Value::Int(i) => i as f64,
        Value::Float(f) => f,
        Value::NaN => f64::NAN,
        _ => unreachable!("to_number only produces Int, Float, or NaN"),
    }
}

/// `ToString`, for display and for the non-numeric side of `+`.
pub fn to_display_string(heap: &Heap<Object>, value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::NaN => "NaN".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Object(id) => match heap.get(*id) {
            Some(Object::Str(s)) => s.bytes.clone(),
            Some(Object::BoolBox(b)) => b.boolean.to_string(),
            Some(Object::Array(a)) => a
                .items
                .iter()
                .map(|v| to_display_string(heap, v))
                .collect::<Vec<_>>()
                .join(","),
            Some(Object::Error(e)) => format!("{}: {}", e.name, e.message),
            Some(obj) => format!("[object {}]", obj.class_name()),
            None => "undefined".to_string(),
        },
        Value::Ref(_) | Value::ProtoKey => "undefined".to_string(),
    }
}

fn format_float(f: f64) -> String {
    if f == f.trunc() && f.is_finite() && f.abs() < 1e21 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

/// `typeof`.
pub fn type_name(heap: &Heap<Object>, value: &Value) -> &'static str {
    match value {
        Value::Undefined => "undefined",
        Value::Null => "object",
        Value::NaN | Value::Int(_) | Value::Float(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Object(id) => heap.get(*id).map(|o| o.typeof_name()).unwrap_or("undefined"),
        Value::Ref(_) | Value::ProtoKey => "undefined",
    }
}

/// Strict equality (`===`): tag-exact, then component equality. Object
/// references compare by identity except strings and arrays, which compare
/// structurally.
pub fn strict_equals(heap: &Heap<Object>, a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::NaN, Value::NaN) => false,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => (*x as f64) == *y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => {
            if x == y {
                return true;
            }
            match (heap.get(*x), heap.get(*y)) {
                (Some(Object::Str(sx)), Some(Object::Str(sy))) => sx.bytes == sy.bytes,
                (Some(Object::Array(ax)), Some(Object::Array(ay))) => {
                    ax.items.len() == ay.items.len()
                        && ax
                            .items
                            .iter()
                            .zip(ay.items.iter())
                            .all(|(i, j)| strict_equals(heap, i, j))
                }
                _ => false,
            }
        }
        _ => false,
    }
}

/// The result of a relational comparison (`<`, `<=`, `>`, `>=`): both sides
/// convert to number first, and a `NaN` on either side makes every
/// ordering comparison false.
pub fn less_than(heap: &Heap<Object>, a: &Value, b: &Value) -> bool {
    let (x, y) = (as_f64(heap, a), as_f64(heap, b));
    if x.is_nan() || y.is_nan() { false } else { x < y }
}

/// See [`less_than`].
pub fn less_equal(heap: &Heap<Object>, a: &Value, b: &Value) -> bool {
    let (x, y) = (as_f64(heap, a), as_f64(heap, b));
    if x.is_nan() || y.is_nan() { false } else { x <= y }
}

/// Numeric binary op kinds the VM's arithmetic opcodes cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Evaluate an arithmetic opcode. Integer operands that stay in `i32`
/// range after the operation produce `Int`; otherwise the result widens to
/// `Float`. `%`/`/` by a zero divisor and any NaN operand yield `NaN`.
pub fn arith(heap: &Heap<Object>, op: ArithOp, a: &Value, b: &Value) -> Value {
    let lhs = to_number(heap, a);
    let rhs = to_number(heap, b);
    if matches!(lhs, Value::NaN) || matches!(rhs, Value::NaN) {
        return Value::NaN;
    }
    if let (Value::Int(x), Value::Int(y)) = (&lhs, &rhs) {
        let (x, y) = (*x, *y);
        return match op {
            ArithOp::Add => match x.checked_add(y) {
                Some(r) => Value::int(r),
                None => Value::float(x as f64 + y as f64),
            },
            ArithOp::Sub => match x.checked_sub(y) {
                Some(r) => Value::int(r),
                None => Value::float(x as f64 - y as f64),
            },
            ArithOp::Mul => match x.checked_mul(y) {
                Some(r) => Value::int(r),
                None => Value::float(x as f64 * y as f64),
            },
            ArithOp::Div => {
                if y == 0 {
                    Value::NaN
                } else if x % y == 0 {
                    Value::int(x / y)
                } else {
                    Value::float(x as f64 / y as f64)
                }
            }
            ArithOp::Mod => {
                if y == 0 {
                    Value::NaN
                } else {
                    Value::int(x % y)
                }
            }
        };
    }
    let x = as_f64(heap, &lhs);
    let y = as_f64(heap, &rhs);
    Value::float(match op {
        ArithOp::Add => x + y,
        ArithOp::Sub => x - y,
        ArithOp::Mul => x * y,
        ArithOp::Div => {
            if y == 0.0 {
                return Value::NaN;
            }
            x / y
        }
        ArithOp::Mod => {
            if y == 0.0 {
                return Value::NaN;
            }
            x % y
        }
    })
}

/// `+`/`-` 1, used by prefix `++`/`--`. `null` becomes `1`/`-1`; a boolean
/// becomes `1`/`0` adjusted by the step; an object (other than a numeric
/// box) becomes `NaN`.
pub fn step(heap: &Heap<Object>, value: &Value, delta: i32) -> Value {
    match value {
        Value::Null => Value::int(delta),
        Value::Bool(b) => Value::int(if *b { 1 } else { 0 } + delta),
        Value::Undefined | Value::NaN => Value::NaN,
        Value::Int(i) => match i.checked_add(delta) {
            Some(r) => Value::int(r),
            None => Value::float(*i as f64 + delta as f64),
        },
        Value::Float(f) => Value::float(f + delta as f64),
        Value::Object(_) => match to_number(heap, value) {
            Value::NaN => Value::NaN,
            n => step(heap, &n, delta),
        },
        Value::Ref(_) | Value::ProtoKey => Value::NaN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use djs_gc::Heap;

    fn new_heap() -> Heap<Object> {
        Heap::new(16)
    }

    #[test]
    fn mod_and_div_by_zero_yield_nan() {
        let heap = new_heap();
        assert_eq!(arith(&heap, ArithOp::Mod, &Value::int(5), &Value::int(0)), Value::NaN);
        assert_eq!(arith(&heap, ArithOp::Div, &Value::int(5), &Value::int(0)), Value::NaN);
    }

    #[test]
    fn nan_propagates_through_arithmetic() {
        let heap = new_heap();
        assert_eq!(arith(&heap, ArithOp::Add, &Value::NaN, &Value::int(1)), Value::NaN);
    }

    #[test]
    fn integer_arithmetic_stays_integer() {
        let heap = new_heap();
        assert_eq!(arith(&heap, ArithOp::Add, &Value::int(2), &Value::int(3)), Value::int(5));
        assert_eq!(arith(&heap, ArithOp::Div, &Value::int(6), &Value::int(3)), Value::int(2));
        assert_eq!(arith(&heap, ArithOp::Div, &Value::int(7), &Value::int(2)), Value::Float(3.5));
    }

    #[test]
    fn relational_short_circuits_on_nan() {
        let heap = new_heap();
        assert!(!less_than(&heap, &Value::NaN, &Value::int(1)));
        assert!(!less_equal(&heap, &Value::int(1), &Value::NaN));
        assert!(less_than(&heap, &Value::int(1), &Value::int(2)));
    }

    #[test]
    fn strict_equality_distinguishes_nan_from_itself() {
        let heap = new_heap();
        assert!(!strict_equals(&heap, &Value::NaN, &Value::NaN));
    }

    #[test]
    fn strict_equality_is_structural_for_strings() {
        let mut heap = new_heap();
        let a = heap.add(Object::string(None, "hi")).unwrap();
        let b = heap.add(Object::string(None, "hi")).unwrap();
        assert!(strict_equals(&heap, &Value::Object(a), &Value::Object(b)));
    }

    #[test]
    fn increment_rules_for_null_and_bool() {
        let heap = new_heap();
        assert_eq!(step(&heap, &Value::Null, 1), Value::int(1));
        assert_eq!(step(&heap, &Value::Null, -1), Value::int(-1));
        assert_eq!(step(&heap, &Value::Bool(true), 1), Value::int(2));
        assert_eq!(step(&heap, &Value::Bool(false), -1), Value::int(-1));
    }

    #[test]
    fn string_concat_display_uses_textual_conversion() {
        let heap = new_heap();
        assert_eq!(to_display_string(&heap, &Value::int(42)), "42");
        assert_eq!(to_display_string(&heap, &Value::float(1.5)), "1.5");
        assert_eq!(to_display_string(&heap, &Value::Null), "null");
    }
}
