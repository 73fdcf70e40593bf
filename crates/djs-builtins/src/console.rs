//! `console.log`/`console.error` (§4.10): variadic, space-joined
//! `ToString` of every argument, routed through `tracing` so a host's
//! log-level filter controls visibility the same way it controls every
//! other diagnostic this workspace emits.

use djs_compiler::PreloadEntry;
use djs_value::{ObjectId, Value, to_display_string};
use djs_vm::{NativeContext, NativeRegistry};

use crate::register_method;

pub(crate) fn install(entries: &mut Vec<PreloadEntry>, registry: &mut NativeRegistry) {
    entries.push(PreloadEntry::object("console"));
    register_method(entries, registry, "console", "log", "console.log", 0, log);
    register_method(entries, registry, "console", "error", "console.error", 0, error);
}

fn join_args(ctx: &NativeContext, argc: u32) -> String {
    (0..argc as usize)
        .map(|i| to_display_string(ctx.heap(), &ctx.arg(i)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn log(ctx: &mut NativeContext, _own_pool: ObjectId, argc: u32) -> bool {
    tracing::info!(target: "djs::console", "{}", join_args(ctx, argc));
    ctx.set_result(Value::Undefined);
    true
}

fn error(ctx: &mut NativeContext, _own_pool: ObjectId, argc: u32) -> bool {
    tracing::warn!(target: "djs::console", "{}", join_args(ctx, argc));
    ctx.set_result(Value::Undefined);
    true
}
