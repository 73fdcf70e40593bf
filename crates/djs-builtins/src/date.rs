//! `Date.now()` (§4.10): the one native in this catalog that touches
//! non-deterministic, wall-clock state (§5, "only host-supplied native
//! functions may block" — reading the clock is this subset's analogue).

use std::time::{SystemTime, UNIX_EPOCH};

use djs_compiler::PreloadEntry;
use djs_value::{ObjectId, Value};
use djs_vm::{NativeContext, NativeRegistry};

use crate::register_method;

pub(crate) fn install(entries: &mut Vec<PreloadEntry>, registry: &mut NativeRegistry) {
    entries.push(PreloadEntry::object("Date"));
    register_method(entries, registry, "Date", "now", "Date.now", 0, now);
}

fn now(ctx: &mut NativeContext, _own_pool: ObjectId, _argc: u32) -> bool {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0);
    ctx.set_result(Value::float(millis));
    true
}
