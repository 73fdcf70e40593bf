//! Host-native function contract (§6): `fn(ctx, own_pool, argc) -> bool`.
//!
//! The VM reads arguments from the operand stack itself before handing
//! the call off, so a native never touches raw stack indices — it goes
//! through [`NativeContext::arg`]/[`NativeContext::this`] instead. A
//! native signals failure by returning `false` after calling
//! [`NativeContext::fail`]; the VM turns that into a `VmError::Function`
//! and halts (§7, "Native errors").

use djs_gc::{Heap, ObjectId};
use djs_value::{Object, Value};

use crate::prelude::ResolvedBasePrototypes;

/// A host-callable function pointer, resolved by name through a
/// [`NativeRegistry`] and invoked by the VM's `object_call`/`ctor_call`
/// dispatch.
///
/// `own_pool` is the native function's *own* heap object id (not
/// `this` — read that via [`NativeContext::this`]), mirroring the
/// property pool every other callable carries.
pub type NativeFn = fn(&mut NativeContext, own_pool: ObjectId, argc: u32) -> bool;

/// Everything a native function body needs: argument access, the
/// active `this`, and a mutable view of the heap and base-prototype
/// table, without exposing the VM's operand stack or frame internals.
pub struct NativeContext<'a> {
    heap: &'a mut Heap<Object>,
    base_prototypes: &'a ResolvedBasePrototypes,
    args: &'a [Value],
    this_value: &'a Value,
    result: Value,
    failure: Option<String>,
}

impl<'a> NativeContext<'a> {
    pub(crate) fn new(
        heap: &'a mut Heap<Object>,
        base_prototypes: &'a ResolvedBasePrototypes,
        args: &'a [Value],
        this_value: &'a Value,
    ) -> Self {
        Self {
            heap,
            base_prototypes,
            args,
            this_value,
            result: Value::Undefined,
            failure: None,
        }
    }

    /// Argument `i`, or `undefined` past the end — identical to how a
    /// bytecode `Lambda` call pads missing arguments (§4.5).
    pub fn arg(&self, i: usize) -> Value {
        self.args.get(i).cloned().unwrap_or(Value::Undefined)
    }

    /// Number of arguments actually supplied at the call site (may be
    /// less than the native's declared `min_arity`).
    pub fn argc(&self) -> usize {
        self.args.len()
    }

    /// The active `this` binding.
    pub fn this(&self) -> Value {
        self.this_value.clone()
    }

    /// Read-only heap access.
    pub fn heap(&self) -> &Heap<Object> {
        self.heap
    }

    /// Mutable heap access, for allocating result objects (strings,
    /// arrays) or mutating `this` in place.
    pub fn heap_mut(&mut self) -> &mut Heap<Object> {
        self.heap
    }

    /// The resolved base-prototype table, for constructing new
    /// instances of the builtin kinds (a fresh string, array, …).
    pub fn base_prototypes(&self) -> &ResolvedBasePrototypes {
        self.base_prototypes
    }

    /// Allocate a fresh dynamic string linked to `String.prototype`.
    pub fn alloc_string(&mut self, s: impl Into<String>) -> Option<ObjectId> {
        self.heap
            .add(Object::string(Some(self.base_prototypes.string), s))
            .ok()
    }

    /// Allocate a fresh array linked to `Array.prototype`.
    pub fn alloc_array(&mut self, items: Vec<Value>) -> Option<ObjectId> {
        self.heap
            .add(Object::array(Some(self.base_prototypes.array), items))
            .ok()
    }

    /// Set the value the call site will observe as the call's result.
    pub fn set_result(&mut self, value: Value) {
        self.result = value;
    }

    pub(crate) fn into_result(self) -> Value {
        self.result
    }

    /// Record a failure reason; the caller should then `return false`.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    pub(crate) fn take_failure(&mut self) -> Option<String> {
        self.failure.take()
    }
}

/// Name-keyed table of native function bodies, resolved once at VM boot
/// against each `PreludeObject::NativeFn { name, .. }` template. Built by
/// the embedder (`djs-builtins`) and handed to [`crate::Vm::boot`].
#[derive(Default)]
pub struct NativeRegistry {
    by_name: rustc_hash::FxHashMap<String, u32>,
    funcs: Vec<NativeFn>,
}

impl NativeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`, returning the raw id the VM will
    /// later see embedded in a materialized `NativeFunction::native_id`.
    pub fn register(&mut self, name: impl Into<String>, f: NativeFn) -> djs_value::NativeId {
        let id = self.funcs.len() as u32;
        self.funcs.push(f);
        self.by_name.insert(name.into(), id);
        djs_value::NativeId(id)
    }

    /// Resolve a registry key to its id, as the VM does for every
    /// `PreludeObject::NativeFn` template at boot.
    pub fn resolve(&self, name: &str) -> Option<djs_value::NativeId> {
        self.by_name.get(name).map(|&i| djs_value::NativeId(i))
    }

    /// Invoke the function registered under `id`.
    pub fn call(
        &self,
        id: djs_value::NativeId,
        ctx: &mut NativeContext,
        own_pool: ObjectId,
        argc: u32,
    ) -> bool {
        (self.funcs[id.0 as usize])(ctx, own_pool, argc)
    }
}
