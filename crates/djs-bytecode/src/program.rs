//! The compiled program: the sole artifact the compiler hands to the VM.

use crate::constant::ConstantPool;
use crate::error::{BytecodeError, Result};
use crate::instruction::Instruction;

/// A template for an object that must exist in the heap before the first
/// instruction runs. The compiler records these while walking the syntax
/// tree (lambda literals, preloaded natives, base prototypes, anonymous
/// preload objects); the VM materializes them in order when it boots,
/// tenuring every one of them so the GC never reclaims them.
#[derive(Debug, Clone)]
pub enum PreludeObject {
    /// A host-native function, resolved by name against the native
    /// registry the embedder passes to the VM (see `djs-vm`'s
    /// `NativeRegistry` and `djs-builtins`). The catalog of native
    /// functions themselves is an external collaborator (§1).
    NativeFn {
        /// Lookup key in the native registry.
        name: String,
        /// Minimum argument count.
        arity: u32,
    },
    /// A bytecode function (closure rebuilt at call time, §4.6).
    Lambda {
        /// Index into `Program::offsets` identifying this lambda's chunk.
        chunk_id: u32,
        /// Declared parameter count.
        arity: u32,
    },
    /// An empty plain object: either an anonymous preload entry or a base
    /// prototype placeholder.
    PlainObject,
}

/// The fixed set of canonical prototypes wired up at program start (§3,
/// "base-prototypes"), plus the pre-interned `"length"` property key that
/// every array/string/function consults for its length.
///
/// Each field indexes into `Program::heap_prelude`, except `length_key`
/// which indexes into `Program::consts` (it names a string, not an
/// object).
#[derive(Debug, Clone, Default)]
pub struct BasePrototypes {
    /// `Object.prototype`.
    pub object: Option<u32>,
    /// `Boolean.prototype`.
    pub boolean: Option<u32>,
    /// `Number.prototype`.
    pub number: Option<u32>,
    /// `String.prototype`.
    pub string: Option<u32>,
    /// `Array.prototype`.
    pub array: Option<u32>,
    /// `Function.prototype`.
    pub function: Option<u32>,
    /// Constant-pool index of the interned `"length"` key string.
    pub length_key: Option<u32>,
}

/// A property to install on a prelude object once every `heap_prelude`
/// template is materialized (§4.1, "Preload & bootstrap") — the wiring
/// that lets a dotted preload name like `console.log` or
/// `Array.prototype.push` reach a real property instead of a flat
/// global. Both `holder` and `value` name indices into `heap_prelude`,
/// so this never needs its own constant-pool entry.
#[derive(Debug, Clone)]
pub struct PropertyWire {
    /// `heap_prelude` index of the object the property is installed on.
    pub holder_prelude_idx: u32,
    /// The property's key.
    pub key: String,
    /// `heap_prelude` index of the value installed under `key`.
    pub value_prelude_idx: u32,
}

/// One `try { ... } catch (e) { ... }` guard region, in absolute code
/// offsets within a single chunk. The VM consults this table on `throw`
/// to find the nearest enclosing handler instead of relying on the
/// bare `in_try` flag alone, which cannot by itself locate a target
/// across nested guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryRegion {
    /// The chunk this guard belongs to.
    pub chunk_id: u32,
    /// First instruction (absolute index into `Program::code`) covered
    /// by the guard, inclusive.
    pub start: u32,
    /// One past the last instruction covered by the guard.
    pub end: u32,
    /// Absolute index of the `catch` instruction to resume at.
    pub catch_pc: u32,
    /// Local-slot count live at guard entry (the owning chunk's `next_slot`
    /// at the point `try` was compiled). The VM truncates the operand
    /// stack to `frame.sbp + locals_depth` on catch, which drops whatever
    /// the guarded block and the unwound call chain left behind without
    /// clobbering locals the function had already hoisted.
    pub locals_depth: u32,
}

/// A compiled program: constants, a single concatenated code buffer for
/// every chunk (functions and the top-level "main"), the chunk offset
/// table, and everything that must be preloaded into the heap before
/// chunk 0 (main) begins executing.
#[derive(Debug, Clone)]
pub struct Program {
    /// The constant pool, shared across every chunk.
    pub consts: ConstantPool,
    /// Every chunk's instructions concatenated back-to-back, starting
    /// with the implicit top-level "main" chunk.
    pub code: Vec<Instruction>,
    /// Chunk-start indices into `code`, terminated by a trailing `-1`
    /// sentinel (mirrors the original C-array layout this format is
    /// modeled on).
    pub offsets: Vec<i64>,
    /// Always `0` — chunk 0 is main.
    pub entry_chunk_id: u32,
    /// Objects that must be allocated before execution begins.
    pub heap_prelude: Vec<PreludeObject>,
    /// Canonical prototype slots.
    pub base_prototypes: BasePrototypes,
    /// `try`/`catch` guard regions, innermost-first within any chunk
    /// they share (the VM picks the first region whose range contains
    /// the faulting pc).
    pub try_regions: Vec<TryRegion>,
    /// Properties to install on prelude objects once the heap prelude
    /// is fully materialized (§4.1).
    pub property_wires: Vec<PropertyWire>,
}

impl Program {
    /// Number of chunks recorded (not counting the `-1` terminator).
    pub fn chunk_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// The instruction range `[start, end)` for a given chunk id.
    pub fn chunk_range(&self, chunk_id: u32) -> Result<(usize, usize)> {
        let idx = chunk_id as usize;
        if idx + 1 >= self.offsets.len() {
            return Err(BytecodeError::InvalidChunkId(chunk_id));
        }
        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];
        if start < 0 || end < 0 {
            return Err(BytecodeError::MalformedOffsets);
        }
        Ok((start as usize, end as usize))
    }

    /// The instruction slice for a given chunk id.
    pub fn chunk(&self, chunk_id: u32) -> Result<&[Instruction]> {
        let (start, end) = self.chunk_range(chunk_id)?;
        Ok(&self.code[start..end])
    }

    /// The innermost guard region (smallest span) covering `pc`, if any.
    /// Used by the VM to resolve `throw` to a `catch` target.
    pub fn handler_for(&self, pc: u32) -> Option<&TryRegion> {
        self.try_regions
            .iter()
            .filter(|r| pc >= r.start && pc < r.end)
            .min_by_key(|r| r.end - r.start)
    }
}

/// Incrementally assembles a [`Program`].
///
/// Chunks are a two-phase affair: [`reserve_chunk`](Self::reserve_chunk)
/// hands out an id up front, [`fill_chunk`](Self::fill_chunk) supplies its
/// body once compiled. This lets the compiler reserve chunk 0 for the
/// top-level "main" body *before* it descends into any function literal
/// main's own prologue needs to compile first (a hoisted function
/// declaration's lambda must exist, chunk and all, before main's
/// prologue can reference its constant-pool slot) — without losing the
/// "chunk 0 is always main" invariant `build` relies on.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    consts: ConstantPool,
    chunks: Vec<Vec<Instruction>>,
    heap_prelude: Vec<PreludeObject>,
    base_prototypes: BasePrototypes,
    try_regions: Vec<TryRegion>,
    property_wires: Vec<PropertyWire>,
}

impl ProgramBuilder {
    /// Start a new builder with an empty constant pool and code buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to the constant pool while compiling expressions.
    pub fn consts_mut(&mut self) -> &mut ConstantPool {
        &mut self.consts
    }

    /// Reserve a chunk id ahead of compiling its body.
    pub fn reserve_chunk(&mut self) -> u32 {
        let id = self.chunks.len() as u32;
        self.chunks.push(Vec::new());
        id
    }

    /// Supply the instructions for a chunk id obtained from
    /// [`reserve_chunk`](Self::reserve_chunk).
    pub fn fill_chunk(&mut self, id: u32, instructions: Vec<Instruction>) {
        self.chunks[id as usize] = instructions;
    }

    /// Reserve and fill a chunk in one step, returning its chunk id.
    pub fn push_chunk(&mut self, instructions: Vec<Instruction>) -> u32 {
        let id = self.reserve_chunk();
        self.fill_chunk(id, instructions);
        id
    }

    /// Record a heap prelude template, returning its index.
    pub fn push_prelude(&mut self, object: PreludeObject) -> u32 {
        let idx = self.heap_prelude.len() as u32;
        self.heap_prelude.push(object);
        idx
    }

    /// Mutable access to the base prototype table.
    pub fn base_prototypes_mut(&mut self) -> &mut BasePrototypes {
        &mut self.base_prototypes
    }

    /// Record a property wire, applied by the VM once every
    /// `heap_prelude` template has been allocated.
    pub fn push_property_wire(&mut self, holder_prelude_idx: u32, key: impl Into<String>, value_prelude_idx: u32) {
        self.property_wires.push(PropertyWire {
            holder_prelude_idx,
            key: key.into(),
            value_prelude_idx,
        });
    }

    /// Register a `try` guard region. `start`/`end`/`catch_pc` are
    /// offsets relative to the start of `chunk_id`'s own code (as
    /// emitted by the caller while compiling that chunk); `build`
    /// rebases them once every chunk's absolute position is known.
    pub fn push_try_region(&mut self, chunk_id: u32, start: u32, end: u32, catch_pc: u32, locals_depth: u32) {
        self.try_regions.push(TryRegion {
            chunk_id,
            start,
            end,
            catch_pc,
            locals_depth,
        });
    }

    /// Finish assembly, concatenating every chunk's instructions back to
    /// back, recording their start offsets, appending the `-1`
    /// terminator, and fixing the entry chunk at 0 (main).
    pub fn build(self) -> Program {
        let mut code = Vec::new();
        let mut offsets = Vec::with_capacity(self.chunks.len() + 1);
        for chunk in &self.chunks {
            offsets.push(code.len() as i64);
            code.extend(chunk.iter().copied());
        }
        offsets.push(-1);
        let try_regions = self
            .try_regions
            .into_iter()
            .map(|r| {
                let base = offsets[r.chunk_id as usize] as u32;
                TryRegion {
                    chunk_id: r.chunk_id,
                    start: base + r.start,
                    end: base + r.end,
                    catch_pc: base + r.catch_pc,
                    locals_depth: r.locals_depth,
                }
            })
            .collect();
        Program {
            consts: self.consts,
            code,
            offsets,
            entry_chunk_id: 0,
            heap_prelude: self.heap_prelude,
            base_prototypes: self.base_prototypes,
            try_regions,
            property_wires: self.property_wires,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    #[test]
    fn chunk_ranges_cover_concatenated_code() {
        let mut b = ProgramBuilder::new();
        let main = vec![Instruction::bare(Opcode::Nop), Instruction::halt(0)];
        let func = vec![Instruction::ret(true)];
        let main_id = b.push_chunk(main);
        let func_id = b.push_chunk(func);
        let program = b.build();

        assert_eq!(main_id, 0);
        assert_eq!(func_id, 1);
        assert_eq!(program.chunk_count(), 2);
        assert_eq!(program.chunk(0).unwrap().len(), 2);
        assert_eq!(program.chunk(1).unwrap().len(), 1);
        assert_eq!(*program.offsets.last().unwrap(), -1);
    }

    #[test]
    fn invalid_chunk_id_errors() {
        let program = ProgramBuilder::new().build();
        assert!(program.chunk(0).is_err());
    }
}
