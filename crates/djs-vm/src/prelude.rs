//! Heap-prelude materialization (§4.1 "Preload & bootstrap", §3 "Program"):
//! walks `Program::heap_prelude` and `Program::consts` once at boot,
//! allocating every object and string the compiled program assumes
//! already exists before instruction 0 runs, and tenures all of them so
//! the collector never reclaims a compile-time constant.

use rustc_hash::FxHashMap;

use djs_bytecode::{BasePrototypes, ConstSlot, Program, PreludeObject};
use djs_value::{Heap, NativeId, Object, ObjectId, PropKey, Value, property};

use crate::error::{Result, VmError};
use crate::native::NativeRegistry;

/// The canonical prototype objects every builtin kind links to (§3,
/// "base-prototypes"), resolved from `Program::base_prototypes`'
/// prelude indices into concrete heap ids. A host that never preloaded
/// one of the five `Foo::prototype` entries still gets a bare, empty
/// object here rather than a missing slot — every value of that kind
/// simply inherits nothing extra.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedBasePrototypes {
    /// `Object.prototype`.
    pub object: ObjectId,
    /// `Boolean.prototype`.
    pub boolean: ObjectId,
    /// `Number.prototype`.
    pub number: ObjectId,
    /// `String.prototype`.
    pub string: ObjectId,
    /// `Array.prototype`.
    pub array: ObjectId,
    /// `Function.prototype`.
    pub function: ObjectId,
}

/// Output of materializing a [`Program`]'s heap prelude: every
/// `heap_prelude` template's resulting object id (in order), the
/// resolved base-prototype table, and every distinct string constant's
/// heap id (§3, "consts … references to heap objects that must exist
/// before execution").
pub struct Booted {
    /// `heap_prelude[i]`'s materialized id, parallel to the program's list.
    pub prelude_ids: Vec<ObjectId>,
    /// Resolved canonical prototypes.
    pub base_prototypes: ResolvedBasePrototypes,
    /// Constant-pool index -> heap id, populated for every `ConstSlot::Str`
    /// entry (every other slot resolves to a primitive `Value` directly).
    pub string_consts: FxHashMap<u32, ObjectId>,
}

/// Materialize `program`'s heap prelude into `heap`, resolving every
/// `NativeFn` template against `registry` by name. Every object this
/// creates is tenured immediately — none of it is ever swept.
pub fn boot(heap: &mut Heap<Object>, program: &Program, registry: &NativeRegistry) -> Result<Booted> {
    // Object.prototype has no prototype of its own; every other
    // base-prototype template links back to it once all five exist, so
    // plain objects created before boot finishes (e.g. earlier
    // PlainObject templates) simply have `prototype: None` — acceptable
    // since no user code runs until boot completes.
    let mut prelude_ids = Vec::with_capacity(program.heap_prelude.len());
    for template in &program.heap_prelude {
        let obj = match template {
            PreludeObject::NativeFn { name, arity } => {
                let native_id = registry.resolve(name).ok_or_else(|| {
                    VmError::Setup(format!("no native registered under `{name}`"))
                })?;
                Object::native(None, name.clone(), native_id, *arity)
            }
            PreludeObject::Lambda { chunk_id, arity } => Object::lambda(None, *chunk_id, *arity, ""),
            PreludeObject::PlainObject => Object::plain(None),
        };
        let id = heap.add(obj).map_err(|e| VmError::Heap(e.to_string()))?;
        heap.tenure_up_to(id);
        prelude_ids.push(id);
    }

    let base_prototypes = resolve_base_prototypes(heap, &program.base_prototypes, &prelude_ids)?;
    link_prelude_prototypes(heap, program, &prelude_ids, &base_prototypes);
    apply_property_wires(heap, program, &prelude_ids)?;

    let mut string_consts = FxHashMap::default();
    for (idx, slot) in program.consts.iter().enumerate() {
        if let ConstSlot::Str(s) = slot {
            let id = heap
                .add(Object::string(Some(base_prototypes.string), s.clone()))
                .map_err(|e| VmError::Heap(e.to_string()))?;
            heap.tenure_up_to(id);
            string_consts.insert(idx as u32, id);
        }
    }

    Ok(Booted {
        prelude_ids,
        base_prototypes,
        string_consts,
    })
}

fn resolve_base_prototypes(
    heap: &mut Heap<Object>,
    bp: &BasePrototypes,
    prelude_ids: &[ObjectId],
) -> Result<ResolvedBasePrototypes> {
    fn resolve(slot: Option<u32>, heap: &mut Heap<Object>, prelude_ids: &[ObjectId]) -> Result<ObjectId> {
        match slot {
            Some(idx) => prelude_ids
                .get(idx as usize)
                .copied()
                .ok_or_else(|| VmError::Setup(format!("base-prototype index {idx} out of range"))),
            None => {
                let id = heap.add(Object::plain(None)).map_err(|e| VmError::Heap(e.to_string()))?;
                heap.tenure_up_to(id);
                Ok(id)
            }
        }
    }

    Ok(ResolvedBasePrototypes {
        object: resolve(bp.object, heap, prelude_ids)?,
        boolean: resolve(bp.boolean, heap, prelude_ids)?,
        number: resolve(bp.number, heap, prelude_ids)?,
        string: resolve(bp.string, heap, prelude_ids)?,
        array: resolve(bp.array, heap, prelude_ids)?,
        function: resolve(bp.function, heap, prelude_ids)?,
    })
}

/// Link every materialized object's `__proto__` to the matching
/// canonical prototype (plain objects -> `Object.prototype`, natives and
/// lambdas -> `Function.prototype`). The base-prototype placeholders
/// themselves stay linked to nothing but `Object.prototype` (except
/// `Object.prototype` itself), matching a conventional prototype chain.
fn link_prelude_prototypes(
    heap: &mut Heap<Object>,
    program: &Program,
    prelude_ids: &[ObjectId],
    base: &ResolvedBasePrototypes,
) {
    for (id, template) in prelude_ids.iter().zip(program.heap_prelude.iter()) {
        let target = match template {
            PreludeObject::NativeFn { .. } | PreludeObject::Lambda { .. } => Some(base.function),
            PreludeObject::PlainObject => Some(base.object),
        };
        if let (Some(obj), Some(proto)) = (heap.get_mut(*id), target) {
            if *id != proto {
                obj.header_mut().prototype = Some(proto);
            }
        }
    }
    if base.object != base.boolean {
        if let Some(o) = heap.get_mut(base.boolean) {
            o.header_mut().prototype = Some(base.object);
        }
    }
    if base.object != base.number {
        if let Some(o) = heap.get_mut(base.number) {
            o.header_mut().prototype = Some(base.object);
        }
    }
    if base.object != base.string {
        if let Some(o) = heap.get_mut(base.string) {
            o.header_mut().prototype = Some(base.object);
        }
    }
    if base.object != base.array {
        if let Some(o) = heap.get_mut(base.array) {
            o.header_mut().prototype = Some(base.object);
        }
    }
    if base.object != base.function {
        if let Some(o) = heap.get_mut(base.function) {
            o.header_mut().prototype = Some(base.object);
        }
    }
}

/// Install every `Program::property_wires` entry (§4.1, dotted preload
/// names like `console.log`/`Array.prototype.push`) now that every
/// `heap_prelude` template has a live object id.
fn apply_property_wires(heap: &mut Heap<Object>, program: &Program, prelude_ids: &[ObjectId]) -> Result<()> {
    for wire in &program.property_wires {
        let holder = *prelude_ids
            .get(wire.holder_prelude_idx as usize)
            .ok_or_else(|| VmError::Setup(format!("property wire holder index {} out of range", wire.holder_prelude_idx)))?;
        let value = *prelude_ids
            .get(wire.value_prelude_idx as usize)
            .ok_or_else(|| VmError::Setup(format!("property wire value index {} out of range", wire.value_prelude_idx)))?;
        property::write_value(heap, holder, &PropKey::new(wire.key.clone()), Value::Object(value))
            .map_err(|e| VmError::Heap(e.to_string()))?;
    }
    Ok(())
}

/// Resolve a `ConstSlot` at a given pool index to a runtime [`Value`],
/// consulting `booted` for anything heap-resident.
pub fn const_value(program: &Program, booted: &Booted, idx: u32) -> Result<Value> {
    let slot = program
        .consts
        .get(idx)
        .ok_or_else(|| VmError::Setup(format!("constant index {idx} out of range")))?;
    Ok(match slot {
        ConstSlot::Undefined => Value::Undefined,
        ConstSlot::Null => Value::Null,
        ConstSlot::NaN => Value::NaN,
        ConstSlot::Bool(b) => Value::Bool(*b),
        ConstSlot::Int(i) => Value::Int(*i),
        ConstSlot::Float(f) => Value::float(*f),
        ConstSlot::Str(_) => Value::Object(
            *booted
                .string_consts
                .get(&idx)
                .ok_or_else(|| VmError::Setup(format!("string constant {idx} never materialized")))?,
        ),
        ConstSlot::Prelude(p) => Value::Object(
            *booted
                .prelude_ids
                .get(*p as usize)
                .ok_or_else(|| VmError::Setup(format!("prelude index {p} out of range")))?,
        ),
    })
}
