//! The call frame (§3, "Call Frame"): locals addressed as `sbp + slot`
//! stack arithmetic directly against the operand stack, plus an explicit
//! `this_value` field carried alongside rather than stashed in slot 0 of
//! that arithmetic scheme.

use djs_gc::ObjectId;
use djs_value::Value;

/// One activation of a chunk (a `Lambda` call or the top-level "main").
#[derive(Debug)]
pub struct CallFrame {
    /// Which chunk's instructions this frame is executing.
    pub chunk_id: u32,
    /// Absolute index into `Program::code` to resume the *caller* at once
    /// this frame returns.
    pub return_pc: u32,
    /// Stack base pointer: local slot `s` lives at operand-stack index
    /// `sbp + s`.
    pub sbp: usize,
    /// The environment object nested-function closures chain off of
    /// (§4.6). Every frame has one, even if nothing inside it is ever
    /// captured — allocating it unconditionally keeps the calling
    /// convention uniform.
    pub capture_env: ObjectId,
    /// The `this` binding active for the duration of this call.
    pub this_value: Value,
    /// Whether this frame was entered via `ctor_call` (affects the
    /// implicit-return rule in `ret`, §4.5).
    pub is_ctor: bool,
    /// The callee object identity, used only to detect direct
    /// self-recursion for the capture-env chaining rule (§4.6): a
    /// function calling itself reuses the caller's `capture_env`
    /// directly instead of allocating a fresh child of it.
    pub callee_id: Option<ObjectId>,
}

impl CallFrame {
    /// Physical operand-stack index for local slot `slot`.
    pub fn local_index(&self, slot: u16) -> usize {
        self.sbp + slot as usize
    }
}
