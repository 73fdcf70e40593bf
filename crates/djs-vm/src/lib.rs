//! # djs vm
//!
//! The stack-oriented bytecode interpreter (§4): a register/stack-hybrid
//! calling convention over a single growable operand stack, a tracing
//! mark-sweep [`djs_gc::Heap`] of [`djs_value::Object`]s, and a flat
//! [`status::VmStatus`] a host embedder inspects once [`Vm::run`] returns.
//!
//! [`prelude::boot`] materializes everything a [`djs_bytecode::Program`]
//! assumes already exists in the heap; [`Vm::boot`] wraps that plus the
//! rest of the machine's initial state (operand stack, frame stack,
//! program counter) into a single ready-to-run value.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod disasm;
pub mod error;
pub mod frame;
pub mod native;
pub mod prelude;
pub mod status;

use djs_bytecode::{Opcode, Program};
use djs_value::{
    Heap, Object, ObjectId, PropKey, RefFlags, RefTarget, Value, ValueRef, arith, collect,
    property, should_collect, strict_equals, to_display_string, to_number, to_property_key,
    trace_value, type_name, ArithOp, Descriptor,
};

pub use config::VmConfig;
pub use error::{Result, VmError};
pub use frame::CallFrame;
pub use native::{NativeContext, NativeFn, NativeRegistry};
pub use prelude::{Booted, ResolvedBasePrototypes};
pub use status::VmStatus;

/// Name under which `Function.prototype.call`'s sentinel native is
/// installed at boot (§4.5). Never resolved through [`NativeRegistry`] —
/// [`Vm::dispatch_call`] intercepts it by name before consulting the
/// registry at all, since rebinding `this` and re-dispatching is VM-core
/// behavior rather than an external collaborator's concern.
const CALL_INTRINSIC_NAME: &str = "<call-intrinsic>";

/// Either halt the run loop with a final status, or keep stepping.
enum StepOutcome {
    Continue,
    Halt(VmStatus),
}

/// The bytecode interpreter: owns the heap, the operand/frame stacks, and
/// the program counter, and drives them to completion in [`Vm::run`].
pub struct Vm {
    heap: Heap<Object>,
    program: Program,
    stack: Vec<Value>,
    frames: Vec<CallFrame>,
    ip: u32,
    config: VmConfig,
    base_prototypes: ResolvedBasePrototypes,
    registry: NativeRegistry,
    booted: Booted,
    pending_exception: Option<Value>,
    last_exception_display: Option<String>,
}

impl Vm {
    /// Materialize `program`'s heap prelude, install the call-intrinsic
    /// sentinel, and return a machine positioned at the first instruction
    /// of chunk 0 (main), ready for [`Vm::run`].
    pub fn boot(program: Program, config: VmConfig, registry: NativeRegistry) -> Result<Vm> {
        let mut heap: Heap<Object> = Heap::new(config.heap_capacity);
        let booted = prelude::boot(&mut heap, &program, &registry)?;
        let base_prototypes = booted.base_prototypes;
        install_call_intrinsic(&mut heap, &base_prototypes)?;

        let global_env = heap
            .add(Object::plain(None))
            .map_err(|e| VmError::Heap(e.to_string()))?;

        let (entry_start, _) = program.chunk_range(program.entry_chunk_id)?;
        let main_frame = CallFrame {
            chunk_id: program.entry_chunk_id,
            return_pc: 0,
            sbp: 0,
            capture_env: global_env,
            this_value: Value::Undefined,
            is_ctor: false,
            callee_id: None,
        };

        Ok(Vm {
            heap,
            program,
            stack: Vec::new(),
            frames: vec![main_frame],
            ip: entry_start as u32,
            config,
            base_prototypes,
            registry,
            booted,
            pending_exception: None,
            last_exception_display: None,
        })
    }

    /// Run until `halt`, an unhandled exception, or an internal error,
    /// returning the flat status a host embedder acts on.
    pub fn run(&mut self) -> VmStatus {
        loop {
            match self.step() {
                Ok(StepOutcome::Continue) => {}
                Ok(StepOutcome::Halt(status)) => return status,
                Err(e) => {
                    if let VmError::UnhandledException(ref msg) = e {
                        self.last_exception_display = Some(msg.clone());
                    }
                    tracing::warn!(error = %e, "vm halted");
                    return e.status();
                }
            }
        }
    }

    /// The exception's display string, if the run ended in
    /// [`VmStatus::UnhandledException`].
    pub fn uncaught_exception(&self) -> Option<&str> {
        self.last_exception_display.as_deref()
    }

    /// The program this machine is executing, for a CLI's disassembly
    /// flag to inspect after boot.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The live heap, for a host to resolve a returned `Value::Object`
    /// handle (e.g. through `djs_value::to_display_string`) after `run`
    /// returns.
    pub fn heap(&self) -> &Heap<Object> {
        &self.heap
    }

    /// Read a top-level `var`/function binding by name off the main
    /// frame's global environment object, once `run` has returned. A
    /// script has no other way to hand a value back to its host (§6
    /// defines no "program result" slot) — this is the same lookup a
    /// top-level `Ident` read performs during execution, exposed for a
    /// host embedder or test harness to call after halt.
    pub fn read_global(&self, name: &str) -> Option<Value> {
        let global_env = self.frames.first()?.capture_env;
        let key = PropKey::new(name);
        match property::lookup(&self.heap, global_env, &key) {
            djs_value::Descriptor::Missing => None,
            _ => Some(property::get_value(&self.heap, global_env, &key)),
        }
    }

    fn push(&mut self, v: Value) -> Result<()> {
        if self.stack.len() >= self.config.stack_cap {
            return Err(VmError::Stack("operand stack overflow".into()));
        }
        self.stack.push(v);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value> {
        self.stack
            .pop()
            .ok_or_else(|| VmError::Stack("operand stack underflow".into()))
    }

    /// Resolve a `Value` one level: a plain value passes through
    /// unchanged, a `Ref` is read through [`Vm::read_ref`]. Every opcode
    /// that consumes an rvalue runs its operands through this first,
    /// since the same stack slot may hold either shape depending on what
    /// produced it (§4.5).
    fn deref_value(&self, v: Value) -> Result<Value> {
        match v {
            Value::Ref(r) => self.read_ref(&r),
            other => Ok(other),
        }
    }

    fn read_ref(&self, r: &ValueRef) -> Result<Value> {
        match &r.target {
            RefTarget::Property { holder, key } => Ok(property::get_value(&self.heap, *holder, key)),
            RefTarget::Item { holder, index } => Ok(self
                .heap
                .get(*holder)
                .and_then(|o| o.sequential_items())
                .and_then(|items| items.get(*index as usize))
                .cloned()
                .unwrap_or(Value::Undefined)),
            RefTarget::Proto { holder } => Ok(match self.heap.get(*holder).and_then(|o| o.header().prototype) {
                Some(p) => Value::Object(p),
                None => Value::Null,
            }),
            RefTarget::Local { index } => self
                .stack
                .get(*index)
                .cloned()
                .ok_or_else(|| VmError::Stack("dangling local reference".into())),
        }
    }

    fn write_ref(&mut self, r: &ValueRef, value: Value) -> Result<()> {
        match &r.target {
            RefTarget::Property { holder, key } => property::write_value(&mut self.heap, *holder, key, value)
                .map_err(|e| VmError::Heap(e.to_string())),
            RefTarget::Item { holder, index } => {
                if let Some(obj) = self.heap.get_mut(*holder) {
                    if !obj.is_frozen() {
                        if let Some(items) = obj.sequential_items_mut() {
                            if (*index as usize) < items.len() {
                                items[*index as usize] = value;
                            }
                        }
                    }
                }
                Ok(())
            }
            RefTarget::Proto { holder } => {
                if let Some(obj) = self.heap.get_mut(*holder) {
                    obj.header_mut().prototype = match value {
                        Value::Object(id) => Some(id),
                        _ => None,
                    };
                }
                Ok(())
            }
            RefTarget::Local { index } => {
                if let Some(slot) = self.stack.get_mut(*index) {
                    *slot = value;
                    Ok(())
                } else {
                    Err(VmError::Stack("dangling local reference".into()))
                }
            }
        }
    }

    fn alloc(&mut self, obj: Object) -> Result<ObjectId> {
        match self.heap.add(obj.clone()) {
            Ok(id) => Ok(id),
            Err(_) => {
                self.collect_garbage();
                self.heap.add(obj).map_err(|e| VmError::BadHeapAlloc(e.to_string()))
            }
        }
    }

    fn maybe_gc(&mut self) {
        if should_collect(&self.heap, &self.config.gc) {
            self.collect_garbage();
        }
    }

    fn collect_garbage(&mut self) {
        let mut roots = Vec::new();
        for v in &self.stack {
            trace_value(v, &mut |id| roots.push(id));
        }
        for f in &self.frames {
            roots.push(f.capture_env);
            trace_value(&f.this_value, &mut |id| roots.push(id));
        }
        if let Some(exc) = &self.pending_exception {
            trace_value(exc, &mut |id| roots.push(id));
        }
        let stats = collect(&mut self.heap, &roots);
        tracing::debug!(marked = stats.marked, swept = stats.swept, "vm collection cycle");
    }

    fn pop_args(&mut self, argc: usize) -> Result<Vec<Value>> {
        let start = self
            .stack
            .len()
            .checked_sub(argc)
            .ok_or_else(|| VmError::Stack("stack underflow popping call arguments".into()))?;
        let raw: Vec<Value> = self.stack.drain(start..).collect();
        let mut args = Vec::with_capacity(raw.len());
        for v in raw {
            args.push(self.deref_value(v)?);
        }
        Ok(args)
    }

    /// One fetch-decode-execute cycle.
    fn step(&mut self) -> Result<StepOutcome> {
        let pc = self.ip;
        let instr = *self
            .program
            .code
            .get(pc as usize)
            .ok_or_else(|| VmError::Opcode(format!("program counter {pc} out of range")))?;
        self.ip = pc + 1;

        use Opcode::*;
        match instr.op {
            Nop => {}
            Dup => {
                let top = self.stack.last().cloned().ok_or_else(|| VmError::Stack("dup on empty stack".into()))?;
                self.push(top)?;
            }
            Pop => {
                self.pop()?;
            }

            PutConst => {
                let v = prelude::const_value(&self.program, &self.booted, instr.u0() as u32)?;
                self.push(v)?;
            }
            DupLocal => {
                let idx = self.frames.last().expect("main frame always present").local_index(instr.u0());
                let v = self
                    .stack
                    .get(idx)
                    .cloned()
                    .ok_or_else(|| VmError::Stack("local slot out of range".into()))?;
                self.push(v)?;
            }
            RefLocal => {
                let idx = self.frames.last().expect("main frame always present").local_index(instr.u0());
                self.push(Value::Ref(Box::new(ValueRef {
                    target: RefTarget::Local { index: idx },
                    flags: RefFlags { writable: true, configurable: true, parent_frozen: false },
                })))?;
            }
            StoreUpval | RefUpval => {
                let key_v = self.pop()?;
                let key_v = self.deref_value(key_v)?;
                let key = to_property_key(&self.heap, &key_v);
                let holder = self.frames.last().expect("main frame always present").capture_env;
                let flags = ref_flags_for(&self.heap, holder, &key);
                self.push(Value::Ref(Box::new(ValueRef { target: RefTarget::Property { holder, key }, flags })))?;
            }
            Deref => {
                let v = self.pop()?;
                let v = self.deref_value(v)?;
                self.push(v)?;
            }
            Emplace => {
                let rhs = self.pop()?;
                let rhs = self.deref_value(rhs)?;
                let lv = self.pop()?;
                let r = match lv {
                    Value::Ref(r) => r,
                    _ => return Err(VmError::BadOperation("assignment target is not an lvalue".into())),
                };
                self.write_ref(&r, rhs.clone())?;
                self.push(rhs)?;
            }
            MakeClosure => {
                let template_v = prelude::const_value(&self.program, &self.booted, instr.u0() as u32)?;
                let template_id = as_object(&template_v)?;
                let env = self.frames.last().expect("main frame always present").capture_env;
                let closure = self
                    .heap
                    .get(template_id)
                    .ok_or_else(|| VmError::Heap("lambda template missing".into()))?
                    .close_over(env);
                let id = self.alloc(closure)?;
                self.push(Value::Object(id))?;
            }
            PutSelf => {
                let id = self
                    .frames
                    .last()
                    .expect("main frame always present")
                    .callee_id
                    .ok_or_else(|| VmError::BadOperation("put_self outside a function frame".into()))?;
                self.push(Value::Object(id))?;
            }

            PutObjDud => {
                let id = self.alloc(Object::plain(Some(self.base_prototypes.object)))?;
                self.push(Value::Object(id))?;
            }
            MakeArr => {
                let n = instr.u0() as usize;
                let start = self
                    .stack
                    .len()
                    .checked_sub(n)
                    .ok_or_else(|| VmError::Stack("stack underflow in make_arr".into()))?;
                let raw: Vec<Value> = self.stack.drain(start..).collect();
                let mut items = Vec::with_capacity(raw.len());
                for v in raw {
                    items.push(self.deref_value(v)?);
                }
                let id = self.alloc(Object::array(Some(self.base_prototypes.array), items))?;
                self.push(Value::Object(id))?;
            }
            PutProtoKey => {
                self.push(Value::ProtoKey)?;
            }
            PutThis => {
                let this = self.frames.last().expect("main frame always present").this_value.clone();
                self.push(this)?;
            }
            GetProp => {
                let key_v = self.pop()?;
                let target_v = self.pop()?;
                let target_v = self.deref_value(target_v)?;
                let holder = as_object(&target_v)?;
                if matches!(key_v, Value::ProtoKey) {
                    self.push(Value::Ref(Box::new(ValueRef {
                        target: RefTarget::Proto { holder },
                        flags: RefFlags::default(),
                    })))?;
                } else {
                    let key_v = self.deref_value(key_v)?;
                    let key = to_property_key(&self.heap, &key_v);
                    let flags = ref_flags_for(&self.heap, holder, &key);
                    self.push(Value::Ref(Box::new(ValueRef { target: RefTarget::Property { holder, key }, flags })))?;
                }
            }
            PutProp => {
                let value = self.pop()?;
                let value = self.deref_value(value)?;
                let key_v = self.pop()?;
                let key_v = self.deref_value(key_v)?;
                let target_v = self.pop()?;
                let target_v = self.deref_value(target_v)?;
                let holder = as_object(&target_v)?;
                let key = to_property_key(&self.heap, &key_v);
                property::write_value(&mut self.heap, holder, &key, value).map_err(|e| VmError::Heap(e.to_string()))?;
            }
            DelProp => {
                let key_v = self.pop()?;
                let key_v = self.deref_value(key_v)?;
                let target_v = self.pop()?;
                let target_v = self.deref_value(target_v)?;
                let holder = as_object(&target_v)?;
                let key = to_property_key(&self.heap, &key_v);
                let removed = property::delete_own(&mut self.heap, holder, &key);
                self.push(Value::Bool(removed))?;
            }

            Numify => {
                let v = self.pop()?;
                let v = self.deref_value(v)?;
                self.push(to_number(&self.heap, &v))?;
            }
            Strcat => {
                let lhs = self.pop()?;
                let lhs = self.deref_value(lhs)?;
                let rhs = self.pop()?;
                let rhs = self.deref_value(rhs)?;
                let s = format!("{}{}", to_display_string(&self.heap, &lhs), to_display_string(&self.heap, &rhs));
                let id = self.alloc(Object::string(Some(self.base_prototypes.string), s))?;
                self.push(Value::Object(id))?;
            }
            Typename => {
                let v = self.pop()?;
                let v = self.deref_value(v)?;
                let name = type_name(&self.heap, &v);
                let id = self.alloc(Object::string(Some(self.base_prototypes.string), name))?;
                self.push(Value::Object(id))?;
            }
            Discard => {
                self.pop()?;
                self.push(Value::Undefined)?;
            }
            PreInc | PreDec => {
                let prefix = instr.u0() != 0;
                let lv = self.pop()?;
                let r = match lv {
                    Value::Ref(r) => r,
                    _ => return Err(VmError::BadOperation("increment target is not an lvalue".into())),
                };
                let old = self.read_ref(&r)?;
                let delta = if instr.op == PreInc { 1 } else { -1 };
                let new_v = djs_value::step(&self.heap, &old, delta);
                self.write_ref(&r, new_v.clone())?;
                self.push(if prefix { new_v } else { old })?;
            }
            Not => {
                let v = self.pop()?;
                let v = self.deref_value(v)?;
                self.push(Value::Bool(!v.is_truthy()))?;
            }

            Mod | Mul | Div | Add | Sub => {
                let lhs = self.pop()?;
                let lhs = self.deref_value(lhs)?;
                let rhs = self.pop()?;
                let rhs = self.deref_value(rhs)?;
                let op = match instr.op {
                    Mod => ArithOp::Mod,
                    Mul => ArithOp::Mul,
                    Div => ArithOp::Div,
                    Add => ArithOp::Add,
                    Sub => ArithOp::Sub,
                    _ => unreachable!(),
                };
                self.push(arith(&self.heap, op, &lhs, &rhs))?;
            }

            TestFalsy => {
                let v = self.pop()?;
                let v = self.deref_value(v)?;
                self.push(Value::Bool(!v.is_truthy()))?;
            }
            StrictEq | Ne | Lt | Le | Gt | Ge => {
                let lhs = self.pop()?;
                let lhs = self.deref_value(lhs)?;
                let rhs = self.pop()?;
                let rhs = self.deref_value(rhs)?;
                let result = match instr.op {
                    StrictEq => strict_equals(&self.heap, &lhs, &rhs),
                    Ne => !strict_equals(&self.heap, &lhs, &rhs),
                    Lt => djs_value::less_than(&self.heap, &lhs, &rhs),
                    Le => djs_value::less_equal(&self.heap, &lhs, &rhs),
                    Gt => djs_value::less_than(&self.heap, &rhs, &lhs),
                    Ge => djs_value::less_equal(&self.heap, &rhs, &lhs),
                    _ => unreachable!(),
                };
                self.push(Value::Bool(result))?;
            }

            Jump => {
                self.ip = apply_offset(pc, instr.offset())?;
            }
            JumpIf => {
                let v = self.pop()?;
                let v = self.deref_value(v)?;
                if v.is_truthy() {
                    self.ip = apply_offset(pc, instr.offset())?;
                }
            }
            JumpElse => {
                let v = self.pop()?;
                let v = self.deref_value(v)?;
                if !v.is_truthy() {
                    self.ip = apply_offset(pc, instr.offset())?;
                }
            }

            ObjectCall => {
                self.exec_object_call(instr.u0() as usize, instr.u1() != 0)?;
            }
            CtorCall => {
                self.exec_ctor_call(instr.u0() as usize)?;
            }
            Ret => {
                if let Some(status) = self.exec_ret(instr.u0() != 0)? {
                    return Ok(StepOutcome::Halt(status));
                }
            }

            Throw => {
                self.exec_throw(pc)?;
            }
            Catch => {
                self.exec_catch(instr.u0())?;
            }

            Halt => return Ok(StepOutcome::Halt(VmStatus::Ok)),
        }
        Ok(StepOutcome::Continue)
    }

    fn exec_object_call(&mut self, argc: usize, has_this: bool) -> Result<()> {
        let callee_v = self.pop()?;
        let this_v = if has_this { self.pop()? } else { Value::Undefined };
        let callee_v = self.deref_value(callee_v)?;
        let this_v = self.deref_value(this_v)?;
        let callee_id = as_object(&callee_v)?;
        self.dispatch_call(callee_id, this_v, argc, false)
    }

    fn exec_ctor_call(&mut self, argc: usize) -> Result<()> {
        let callee_v = self.pop()?;
        let callee_v = self.deref_value(callee_v)?;
        let callee_id = as_object(&callee_v)?;
        let proto_v = property::get_value(&self.heap, callee_id, &PropKey::new("prototype"));
        let proto = match proto_v {
            Value::Object(id) => id,
            _ => self.base_prototypes.object,
        };
        let this_id = self.alloc(Object::plain(Some(proto)))?;
        self.dispatch_call(callee_id, Value::Object(this_id), argc, true)
    }

    /// Dispatch a call (ordinary or `new`) to `callee_id`, whichever kind
    /// of callable it turns out to be. `argc` items are already sitting
    /// on top of the operand stack as the call's arguments.
    fn dispatch_call(&mut self, callee_id: ObjectId, this_value: Value, argc: usize, is_ctor: bool) -> Result<()> {
        let obj = self
            .heap
            .get(callee_id)
            .ok_or_else(|| VmError::Function("call target is not a live object".into()))?;
        match obj {
            Object::Lambda(lo) => {
                let chunk_id = lo.chunk_id;
                let arity = lo.min_arity as usize;
                let def_env = lo.def_env;
                if self.frames.len() >= self.config.call_depth_cap {
                    return Err(VmError::Stack("call depth exceeded".into()));
                }
                let new_sbp = self
                    .stack
                    .len()
                    .checked_sub(argc)
                    .ok_or_else(|| VmError::Stack("stack underflow at call".into()))?;
                match argc.cmp(&arity) {
                    std::cmp::Ordering::Less => self.stack.resize(new_sbp + arity, Value::Undefined),
                    std::cmp::Ordering::Greater => self.stack.truncate(new_sbp + arity),
                    std::cmp::Ordering::Equal => {}
                }

                let caller = self.frames.last().expect("main frame always present");
                let capture_env = if caller.callee_id == Some(callee_id) {
                    caller.capture_env
                } else {
                    // Chain off the closure's defining environment, not the
                    // calling frame's — a closure keeps the scope it was
                    // created in regardless of who invokes it. Falls back to
                    // the caller's env only for a lambda with no def_env
                    // (the un-cloned boot-time template should never reach
                    // here, but main's own chunk never calls itself this way).
                    let parent = def_env.unwrap_or(caller.capture_env);
                    self.alloc(Object::plain(Some(parent)))?
                };

                let (start, _) = self.program.chunk_range(chunk_id)?;
                self.frames.push(CallFrame {
                    chunk_id,
                    return_pc: self.ip,
                    sbp: new_sbp,
                    capture_env,
                    this_value,
                    is_ctor,
                    callee_id: Some(callee_id),
                });
                self.ip = start as u32;
                Ok(())
            }
            Object::Native(nf) => {
                let name = nf.name.clone();
                let native_id = nf.native_id;
                if name == CALL_INTRINSIC_NAME {
                    let mut args = self.pop_args(argc)?;
                    let new_this = if args.is_empty() { Value::Undefined } else { args.remove(0) };
                    let new_argc = args.len();
                    for a in args {
                        self.push(a)?;
                    }
                    let real_callee = match self.deref_value(this_value)? {
                        Value::Object(id) => id,
                        _ => return Err(VmError::Function("Function.prototype.call target is not callable".into())),
                    };
                    return self.dispatch_call(real_callee, new_this, new_argc, is_ctor);
                }
                let args = self.pop_args(argc)?;
                let result = {
                    let mut ctx = NativeContext::new(&mut self.heap, &self.base_prototypes, &args, &this_value);
                    let ok = self.registry.call(native_id, &mut ctx, callee_id, argc as u32);
                    if ok {
                        Ok(ctx.into_result())
                    } else {
                        Err(ctx.take_failure().unwrap_or_else(|| "native function failed".into()))
                    }
                };
                match result {
                    Ok(v) => self.push(v),
                    Err(reason) => Err(VmError::Function(reason)),
                }
            }
            _ => Err(VmError::Function("value is not callable".into())),
        }
    }

    /// Unwind the current frame. Returns `Some(status)` only for the
    /// degenerate case of trying to return from the top-level frame
    /// (never emitted by the compiler, but guarded against regardless).
    fn exec_ret(&mut self, implicit: bool) -> Result<Option<VmStatus>> {
        if self.frames.len() <= 1 {
            return Err(VmError::Opcode("cannot return from the top-level frame".into()));
        }
        let frame = self.frames.pop().expect("checked above");
        let value = if implicit {
            if frame.is_ctor { frame.this_value.clone() } else { Value::Undefined }
        } else {
            let v = self.pop()?;
            self.deref_value(v)?
        };
        self.stack.truncate(frame.sbp);
        self.push(value)?;
        self.ip = frame.return_pc;
        self.maybe_gc();
        Ok(None)
    }

    fn exec_throw(&mut self, throw_pc: u32) -> Result<()> {
        let v = self.pop()?;
        let v = self.deref_value(v)?;
        self.pending_exception = Some(v.clone());
        if self.propagate_exception(throw_pc) {
            Ok(())
        } else {
            let display = to_display_string(&self.heap, &v);
            Err(VmError::UnhandledException(display))
        }
    }

    /// Walk the handler table from `search_pc` outward, popping frames as
    /// needed, until a `try` region covers the search point or the call
    /// stack is exhausted (§4.3, "Exceptions").
    fn propagate_exception(&mut self, throw_pc: u32) -> bool {
        let mut search_pc = throw_pc;
        loop {
            if let Some(region) = self.program.handler_for(search_pc).copied() {
                let frame = self.frames.last().expect("main frame always present");
                self.stack.truncate(frame.sbp + region.locals_depth as usize);
                self.ip = region.catch_pc;
                return true;
            }
            if self.frames.len() <= 1 {
                return false;
            }
            let popped = self.frames.pop().expect("checked above");
            search_pc = popped.return_pc.saturating_sub(1);
        }
    }

    fn exec_catch(&mut self, slot: u16) -> Result<()> {
        let exc = self.pending_exception.take().unwrap_or(Value::Undefined);
        let idx = self.frames.last().expect("main frame always present").local_index(slot);
        if idx >= self.stack.len() {
            self.stack.resize(idx + 1, Value::Undefined);
        }
        self.stack[idx] = exc;
        Ok(())
    }
}

fn apply_offset(pc: u32, offset: i32) -> Result<u32> {
    let target = pc as i64 + offset as i64;
    if target < 0 {
        return Err(VmError::Opcode("jump target underflowed zero".into()));
    }
    Ok(target as u32)
}

fn as_object(v: &Value) -> Result<ObjectId> {
    match v {
        Value::Object(id) => Ok(*id),
        _ => Err(VmError::BadOperation("operation requires an object operand".into())),
    }
}

/// Snapshot the writability/configurability a freshly-minted `Ref` should
/// carry for `holder[key]`, so `Emplace`/`PreInc`/`PreDec` can honor
/// frozen/non-extensible targets without re-running the lookup (§4.4).
fn ref_flags_for(heap: &Heap<Object>, holder: ObjectId, key: &PropKey) -> RefFlags {
    match property::lookup(heap, holder, key) {
        Descriptor::Own { holder, key } => heap
            .get(holder)
            .and_then(|o| {
                o.header().properties.get(&key).map(|slot| RefFlags {
                    writable: slot.writable,
                    configurable: slot.configurable,
                    parent_frozen: o.is_frozen(),
                })
            })
            .unwrap_or_default(),
        Descriptor::Item { holder, .. } => {
            let frozen = heap.get(holder).map(|o| o.is_frozen()).unwrap_or(false);
            RefFlags { writable: !frozen, configurable: true, parent_frozen: frozen }
        }
        Descriptor::Length(_) => RefFlags { writable: false, configurable: false, parent_frozen: false },
        Descriptor::Missing => RefFlags { writable: true, configurable: true, parent_frozen: false },
    }
}

/// Install the `Function.prototype.call` sentinel native (§4.5): a real
/// `"call"` property on `Function.prototype` whose presence lets ordinary
/// member-call emission (`fn.call(...)`) reach it through normal property
/// lookup, with no dedicated opcode or compiler support.
fn install_call_intrinsic(heap: &mut Heap<Object>, base: &ResolvedBasePrototypes) -> Result<()> {
    let sentinel_id = djs_value::NativeId(u32::MAX);
    let obj = Object::native(Some(base.function), CALL_INTRINSIC_NAME, sentinel_id, 0);
    let id = heap.add(obj).map_err(|e| VmError::Heap(e.to_string()))?;
    heap.tenure_up_to(id);
    property::write_value(heap, base.function, &PropKey::new("call"), Value::Object(id))
        .map_err(|e| VmError::Heap(e.to_string()))
}
