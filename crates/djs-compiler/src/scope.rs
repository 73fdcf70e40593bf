//! Per-function compilation state (§4.1). One [`Scope`] exists for the
//! top-level "main" body and one for every function literal currently
//! being emitted; they nest on [`crate::Compiler`]'s scope stack exactly
//! as the function literals nest in source.

use std::collections::HashSet;

use djs_bytecode::Instruction;
use rustc_hash::FxHashMap;

/// Per-loop jump fixups, collected while compiling a `while`/`for` body
/// and patched once the loop's exit and continuation targets are known.
#[derive(Debug, Default)]
pub(crate) struct LoopFrame {
    /// Code positions of `break`'s placeholder jumps.
    pub break_jumps: Vec<usize>,
    /// Code positions of `continue`'s placeholder jumps.
    pub continue_jumps: Vec<usize>,
}

/// Compilation state for one function body (or the top-level script).
pub(crate) struct Scope {
    /// Chunk id reserved for this scope's code (§3, "Program").
    pub chunk_id: u32,
    /// Instructions emitted so far, chunk-relative.
    pub code: Vec<Instruction>,
    /// Name -> stack slot, for names bound to a physical local slot
    /// (params, and any hoisted var/function not promoted to the
    /// capture environment).
    pub locals: FxHashMap<String, u16>,
    /// Next free slot number.
    pub next_slot: u16,
    /// This function's own bound names that some nested function reads
    /// or writes — these live on the capture-environment object rather
    /// than a stack slot (§4.6).
    pub captured: HashSet<String>,
    /// Every name this function binds (params, hoisted vars/functions,
    /// its own name if a named function expression) — used by nested
    /// scopes to decide whether a free identifier resolves through the
    /// environment chain or is a true global/unresolved reference.
    pub all_bound: HashSet<String>,
    /// This function's own name, if it is a named function
    /// expression/declaration (enables self-recursion via `put_self`).
    pub self_name: Option<String>,
    /// Active loop fixup frames, innermost last.
    pub loop_stack: Vec<LoopFrame>,
    /// Number of `try` blocks (not handlers) currently being compiled,
    /// enclosing the point of emission — mirrors the `in_try` bit
    /// `throw` carries (§4.5).
    pub try_depth: u32,
}

impl Scope {
    /// The function's position in its own code buffer — the next
    /// instruction's chunk-relative offset.
    pub fn pos(&self) -> usize {
        self.code.len()
    }
}
