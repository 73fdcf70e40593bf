//! # djs compiler
//!
//! Lowers a [`djs_ast::TranslationUnit`] into a [`djs_bytecode::Program`]
//! (§4.1). The walk is organized the way the language subset is: one
//! module for hoisting analysis, one for closure-capture analysis, one
//! for the host preload list, and one each for expression/statement
//! emission, all sharing the [`Compiler`]'s scope stack.
//!
//! This crate knows nothing about the heap or runtime value
//! representation — it only ever talks to `djs-bytecode`'s symbolic
//! constant pool and chunk format.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

mod capture;
pub mod error;
mod expr;
mod hoist;
mod scope;
mod stmt;

pub mod preload;

pub use error::{CompileError, Result};
pub use preload::{LocationKind, PreloadEntity, PreloadEntry, PrimitiveConst};

use djs_ast::TranslationUnit;
use djs_bytecode::{ConstSlot, Instruction, Program, ProgramBuilder, PreludeObject};
use rustc_hash::FxHashMap;
use std::collections::HashSet;

use scope::Scope;

/// Lower a parsed translation unit into a compiled program.
///
/// Multiple source units are concatenated into one implicit top-level
/// body, in translation-unit order, sharing a single hoisting scope —
/// this subset has no module system (§1, Non-goals), so "several
/// files" behaves like several `<script>` tags run back to back.
pub fn compile(unit: &TranslationUnit, preload: &[PreloadEntry]) -> Result<Program> {
    let mut compiler = Compiler::new();
    compiler.bootstrap(preload)?;
    compiler.compile_main(unit)?;
    Ok(compiler.builder.build())
}

/// Walks the translation unit and emits into a [`ProgramBuilder`].
pub(crate) struct Compiler {
    pub(crate) builder: ProgramBuilder,
    /// Global name -> constant-pool index, populated by the preload
    /// walk (§4.1, "Symbol resolution", priority 1).
    pub(crate) globals: FxHashMap<String, u32>,
    /// Property-key string -> constant-pool index, deduplicating every
    /// key constant this compiler has ever interned (object-literal
    /// keys, member-access keys, closure-capture keys).
    pub(crate) key_consts: FxHashMap<String, u32>,
    /// Preload entry name (a global name or an `"X::prototype"` target)
    /// -> its `heap_prelude` index, so later entries can be wired as its
    /// property (§4.1, dotted preload names).
    holder_prelude_idx: FxHashMap<String, u32>,
    pub(crate) scopes: Vec<Scope>,

    pub(crate) undefined_const: u32,
    pub(crate) null_const: u32,
    pub(crate) nan_const: u32,
    pub(crate) true_const: u32,
    pub(crate) false_const: u32,
    pub(crate) neg_one_const: u32,
    pub(crate) pos_one_const: u32,
}

impl Compiler {
    fn new() -> Self {
        let mut builder = ProgramBuilder::new();
        let undefined_const = builder.consts_mut().intern(ConstSlot::Undefined).unwrap();
        let null_const = builder.consts_mut().intern(ConstSlot::Null).unwrap();
        let nan_const = builder.consts_mut().intern(ConstSlot::NaN).unwrap();
        let true_const = builder.consts_mut().intern(ConstSlot::Bool(true)).unwrap();
        let false_const = builder.consts_mut().intern(ConstSlot::Bool(false)).unwrap();
        let neg_one_const = builder.consts_mut().intern(ConstSlot::Int(-1)).unwrap();
        let pos_one_const = builder.consts_mut().intern(ConstSlot::Int(1)).unwrap();
        Self {
            builder,
            globals: FxHashMap::default(),
            key_consts: FxHashMap::default(),
            holder_prelude_idx: FxHashMap::default(),
            scopes: Vec::new(),
            undefined_const,
            null_const,
            nan_const,
            true_const,
            false_const,
            neg_one_const,
            pos_one_const,
        }
    }

    /// Intern (or reuse) the constant for a numeric literal, choosing
    /// `Int` vs `Float` the way §4.2 assigns (an integral value that
    /// fits `i32` is stored as `Int`; everything else, including `NaN`,
    /// as `Float`/the shared `NaN` singleton).
    pub(crate) fn number_const(&mut self, n: f64) -> error::Result<u32> {
        if n.is_nan() {
            return Ok(self.nan_const);
        }
        let slot = if n.fract() == 0.0 && n >= i32::MIN as f64 && n <= i32::MAX as f64 {
            ConstSlot::Int(n as i32)
        } else {
            ConstSlot::Float(n)
        };
        Ok(self.builder.consts_mut().intern(slot)?)
    }

    /// Intern (or reuse) a property-key string constant.
    pub(crate) fn key_const(&mut self, name: &str) -> error::Result<u32> {
        if let Some(&idx) = self.key_consts.get(name) {
            return Ok(idx);
        }
        let idx = self
            .builder
            .consts_mut()
            .intern(ConstSlot::Str(name.to_string()))?;
        self.key_consts.insert(name.to_string(), idx);
        Ok(idx)
    }

    /// Intern a string-literal constant (distinct call site from
    /// [`Self::key_const`] only for readability — the pool dedups
    /// either way since both produce `ConstSlot::Str`).
    pub(crate) fn string_const(&mut self, s: &str) -> error::Result<u32> {
        Ok(self.builder.consts_mut().intern(ConstSlot::Str(s.to_string()))?)
    }

    fn current(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("no active scope")
    }

    pub(crate) fn pos(&mut self) -> usize {
        self.current().pos()
    }

    pub(crate) fn emit(&mut self, instr: Instruction) {
        self.current().code.push(instr);
    }

    /// Patch a `jump`/`jump_if`/`jump_else` emitted at `site` (an
    /// absolute index into the current scope's own code buffer) to
    /// branch to `target`.
    pub(crate) fn patch_jump(&mut self, site: usize, target: usize) {
        let scope = self.current();
        let offset = target as i64 - site as i64;
        scope.code[site].patch_offset(offset as i32);
    }

    /// Allocate a brand-new stack slot for `name` in the current scope,
    /// returning it. Does not emit anything — callers push the slot's
    /// initial value themselves, which is what makes the stack grow to
    /// cover it.
    pub(crate) fn alloc_slot(&mut self, name: &str) -> u16 {
        let scope = self.current();
        let slot = scope.next_slot;
        scope.next_slot += 1;
        scope.locals.insert(name.to_string(), slot);
        slot
    }

    /// Walk the host preload list, seeding `globals`, `key_consts`, and
    /// the builder's heap prelude / base-prototype table (§4.1,
    /// "Preload & bootstrap", and §6).
    fn bootstrap(&mut self, preload: &[PreloadEntry]) -> error::Result<()> {
        for entry in preload {
            if let Some(target) = entry.base_prototype_target() {
                let prelude_idx = self.builder.push_prelude(PreludeObject::PlainObject);
                let slot = match target {
                    "Object" => &mut self.builder.base_prototypes_mut().object,
                    "Boolean" => &mut self.builder.base_prototypes_mut().boolean,
                    "Number" => &mut self.builder.base_prototypes_mut().number,
                    "String" => &mut self.builder.base_prototypes_mut().string,
                    "Array" => &mut self.builder.base_prototypes_mut().array,
                    "Function" => &mut self.builder.base_prototypes_mut().function,
                    other => {
                        return Err(CompileError::MalformedConstant {
                            reason: format!("unknown base prototype `{other}`"),
                        });
                    }
                };
                *slot = Some(prelude_idx);
                self.holder_prelude_idx.insert(entry.name.clone(), prelude_idx);
                continue;
            }

            match entry.location {
                LocationKind::Constant => {
                    let PreloadEntity::Primitive(ref pc) = entry.entity else {
                        return Err(CompileError::MalformedConstant {
                            reason: format!("entry `{}` is Constant-located but not primitive", entry.name),
                        });
                    };
                    let idx = self.builder.consts_mut().intern(primitive_const_slot(pc))?;
                    if !entry.name.is_empty() {
                        self.globals.insert(entry.name.clone(), idx);
                    }
                }
                LocationKind::HeapObject => {
                    let prelude_idx = match &entry.entity {
                        PreloadEntity::NativeFn { native_name, arity } => {
                            self.builder.push_prelude(PreludeObject::NativeFn {
                                name: native_name.clone(),
                                arity: *arity,
                            })
                        }
                        PreloadEntity::Lambda { chunk_id, arity } => {
                            self.builder.push_prelude(PreludeObject::Lambda {
                                chunk_id: *chunk_id,
                                arity: *arity,
                            })
                        }
                        PreloadEntity::AnonymousObject => {
                            self.builder.push_prelude(PreludeObject::PlainObject)
                        }
                        PreloadEntity::Primitive(_) => {
                            return Err(CompileError::MalformedConstant {
                                reason: format!("entry `{}` is HeapObject-located but primitive", entry.name),
                            });
                        }
                    };
                    if !entry.name.is_empty() {
                        let idx = self.builder.consts_mut().intern(ConstSlot::Prelude(prelude_idx))?;
                        self.globals.insert(entry.name.clone(), idx);
                        self.holder_prelude_idx.insert(entry.name.clone(), prelude_idx);
                    }
                    if let Some((holder_name, key)) = &entry.property_of {
                        let holder_idx = *self.holder_prelude_idx.get(holder_name).ok_or_else(|| {
                            CompileError::MalformedConstant {
                                reason: format!("preload property `{key}` targets unknown holder `{holder_name}`"),
                            }
                        })?;
                        self.builder.push_property_wire(holder_idx, key.clone(), prelude_idx);
                    }
                }
                LocationKind::KeyString => {
                    let PreloadEntity::Primitive(PrimitiveConst::Str(ref s)) = entry.entity else {
                        return Err(CompileError::MalformedConstant {
                            reason: format!("entry `{}` is KeyString-located but not a string", entry.name),
                        });
                    };
                    let idx = self.key_const(s)?;
                    if s == "length" {
                        self.builder.base_prototypes_mut().length_key = Some(idx);
                    }
                }
            }
        }
        Ok(())
    }

    /// Compile the concatenated bodies of every source unit as the
    /// implicit top-level "main" chunk. Guaranteed to land at chunk 0
    /// since this is the first `reserve_chunk` call of the whole
    /// compile (§3, "entry-chunk-id (always 0 — main)").
    fn compile_main(&mut self, unit: &TranslationUnit) -> error::Result<()> {
        let body: Vec<djs_ast::Stmt> = unit
            .units
            .iter()
            .flat_map(|u| u.body.iter().cloned())
            .collect();

        let chunk_id = self.builder.reserve_chunk();
        debug_assert_eq!(chunk_id, 0, "main must be chunk 0");

        let all_bound: HashSet<String> = hoist::bound_names(&[], None, &body).into_iter().collect();
        // Every top-level binding is env-resident, not just the ones a
        // nested function happens to close over: `read_global` (and any
        // other host observing a script's top-level bindings) resolves
        // names purely through the main frame's capture-environment
        // object, so a `var` read/written only at the top level still
        // needs to live there rather than in a bare stack slot.
        let captured = all_bound.clone();

        self.scopes.push(Scope {
            chunk_id,
            code: Vec::new(),
            locals: FxHashMap::default(),
            next_slot: 0,
            captured,
            all_bound,
            self_name: None,
            loop_stack: Vec::new(),
            try_depth: 0,
        });

        self.emit_hoisted_prologue(&body)?;
        for stmt in &body {
            self.emit_stmt(stmt)?;
        }
        self.emit(Instruction::halt(0));

        let scope = self.scopes.pop().expect("main scope pushed above");
        self.builder.fill_chunk(chunk_id, scope.code);
        Ok(())
    }
}

fn primitive_const_slot(pc: &PrimitiveConst) -> ConstSlot {
    match pc {
        PrimitiveConst::Undefined => ConstSlot::Undefined,
        PrimitiveConst::Null => ConstSlot::Null,
        PrimitiveConst::NaN => ConstSlot::NaN,
        PrimitiveConst::Bool(b) => ConstSlot::Bool(*b),
        PrimitiveConst::Int(i) => ConstSlot::Int(*i),
        PrimitiveConst::Float(f) => ConstSlot::Float(*f),
        PrimitiveConst::Str(s) => ConstSlot::Str(s.clone()),
    }
}
