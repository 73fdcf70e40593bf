//! Function-literal compilation and the hoisting prologue shared by
//! every scope (the top-level script and every nested function body,
//! §4.1 "Two-pass emission for hoisting").

use std::collections::HashSet;

use djs_ast::Stmt;
use djs_bytecode::{ConstSlot, Instruction, PreludeObject};
use rustc_hash::FxHashMap;

use crate::capture;
use crate::error::Result;
use crate::hoist::{self, HoistedFunction};
use crate::scope::Scope;
use crate::Compiler;

impl Compiler {
    /// Compile a function literal (expression or declaration), emitting
    /// its `Lambda` template into the prelude/constant pool and
    /// returning the constant index the use site feeds to
    /// `make_closure` to produce an actual callable instance.
    ///
    /// The lambda's constant index is reserved *before* its body is
    /// compiled — `chunk_id` and `arity` are already known at this
    /// point — which is what lets a self-reference inside the body
    /// resolve to `self_name`/`put_self` rather than a patched
    /// placeholder.
    pub(crate) fn compile_function_literal(
        &mut self,
        name: Option<&str>,
        params: &[String],
        body: &[Stmt],
    ) -> Result<u32> {
        let chunk_id = self.builder.reserve_chunk();
        let arity = params.len() as u32;
        let prelude_idx = self.builder.push_prelude(PreludeObject::Lambda { chunk_id, arity });
        let lambda_const_idx = self.builder.consts_mut().intern(ConstSlot::Prelude(prelude_idx))?;

        let captured = capture::captured_locals(params, name, body);
        let all_bound: HashSet<String> = hoist::bound_names(params, name, body).into_iter().collect();

        self.scopes.push(Scope {
            chunk_id,
            code: Vec::new(),
            locals: FxHashMap::default(),
            next_slot: 0,
            captured,
            all_bound,
            self_name: name.map(str::to_string),
            loop_stack: Vec::new(),
            try_depth: 0,
        });

        for (i, param) in params.iter().enumerate() {
            self.current_scope_mut().locals.insert(param.clone(), i as u16);
        }
        self.current_scope_mut().next_slot = params.len() as u16;

        for param in params {
            if self.current_scope_mut().captured.contains(param) {
                self.sync_captured_param(param)?;
            }
        }

        self.emit_hoisted_prologue(body)?;
        for stmt in body {
            self.emit_stmt(stmt)?;
        }
        self.emit(Instruction::ret(true));

        let scope = self.scopes.pop().expect("scope pushed above");
        self.builder.fill_chunk(chunk_id, scope.code);
        Ok(lambda_const_idx)
    }

    pub(crate) fn current_scope_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("no active scope")
    }

    /// Copy a captured parameter's caller-supplied stack-slot value
    /// into the capture-environment so nested closures observe it too
    /// (§4.6). Params always keep their physical slot for the calling
    /// convention even when captured.
    fn sync_captured_param(&mut self, name: &str) -> Result<()> {
        let slot = *self
            .current_scope_mut()
            .locals
            .get(name)
            .expect("param already bound to a slot");
        let key = self.key_const(name)?;
        self.emit(Instruction::put_const(key as u16));
        self.emit(Instruction::bare(djs_bytecode::Opcode::StoreUpval));
        self.emit(Instruction::dup_local(slot));
        self.emit(Instruction::bare(djs_bytecode::Opcode::Emplace));
        self.emit(Instruction::bare(djs_bytecode::Opcode::Pop));
        Ok(())
    }

    /// Emit the two-pass hoisting prologue: declared function literals
    /// first (bound eagerly, ahead of `var`s), then `var` names
    /// initialized to `undefined`, skipping any name already bound by a
    /// parameter or an earlier function declaration (§4.1).
    pub(crate) fn emit_hoisted_prologue(&mut self, body: &[Stmt]) -> Result<()> {
        let hoisted = hoist::collect_hoisted(body);
        let mut already_bound: HashSet<String> =
            self.current_scope_mut().locals.keys().cloned().collect();

        for HoistedFunction { name, params, body } in &hoisted.functions {
            let lambda_const_idx = self.compile_function_literal(Some(name), params, body)?;
            self.bind_hoisted_name(name, &mut already_bound, lambda_const_idx, true)?;
        }

        for name in &hoisted.vars {
            if already_bound.contains(name) {
                continue;
            }
            let undefined_const = self.undefined_const;
            self.bind_hoisted_name(name, &mut already_bound, undefined_const, false)?;
        }
        Ok(())
    }

    /// Shared binding logic for a hoisted function/var name: if the
    /// name is captured, publish `value_const` on the environment via
    /// `store_upval`; if it already occupies a param's slot, overwrite
    /// that slot in place; otherwise a fresh slot is allocated and the
    /// value both creates and initializes it. `is_closure` is true only
    /// for a hoisted function declaration — its `value_const` names a
    /// `Lambda` template that must be cloned afresh (`make_closure`),
    /// bound to this scope's environment, rather than loaded as a
    /// shared constant the way a plain `var`'s `undefined` is.
    fn bind_hoisted_name(
        &mut self,
        name: &str,
        already_bound: &mut HashSet<String>,
        value_const: u32,
        is_closure: bool,
    ) -> Result<()> {
        already_bound.insert(name.to_string());
        let load = |c: &mut Self| {
            if is_closure {
                c.emit(Instruction::make_closure(value_const as u16));
            } else {
                c.emit(Instruction::put_const(value_const as u16));
            }
        };
        if self.current_scope_mut().captured.contains(name) {
            let key = self.key_const(name)?;
            self.emit(Instruction::put_const(key as u16));
            self.emit(Instruction::bare(djs_bytecode::Opcode::StoreUpval));
            load(self);
            self.emit(Instruction::bare(djs_bytecode::Opcode::Emplace));
            self.emit(Instruction::bare(djs_bytecode::Opcode::Pop));
            return Ok(());
        }
        if let Some(&existing_slot) = self.current_scope_mut().locals.get(name) {
            self.emit(Instruction::ref_local(existing_slot));
            load(self);
            self.emit(Instruction::bare(djs_bytecode::Opcode::Emplace));
            self.emit(Instruction::bare(djs_bytecode::Opcode::Pop));
        } else {
            self.alloc_slot(name);
            load(self);
        }
        Ok(())
    }
}
