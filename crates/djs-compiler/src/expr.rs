//! Expression emission (§4.1, "Expression emission — contracts per
//! kind"). Every function here leaves exactly one net value on the
//! current scope's operand stack: [`Compiler::emit_expr`] a plain
//! rvalue (dereferencing a `value-ref` if one was produced along the
//! way), [`Compiler::emit_expr_ref`] a `value-ref` suitable for
//! `emplace`/`pre_inc`/`pre_dec` or as a call/`new` callee.

use djs_ast::expr::MemberProp;
use djs_ast::{BinaryOp, Expr, LogicalOp, UnaryOp, UpdateOp};
use djs_bytecode::{Instruction, Opcode};

use crate::error::{CompileError, Result};
use crate::Compiler;

/// Where an identifier resolves, per §4.1 "Symbol resolution".
enum IdentLoc {
    /// A physical stack slot in the currently emitting scope.
    Local(u16),
    /// This name lives on some capture-environment object — either the
    /// current scope's own promoted local, or a name bound by an
    /// enclosing function (§4.6).
    Capture,
    /// A named function expression/declaration referencing itself from
    /// inside its own body; resolves to the closure instance actually
    /// executing, not a fixed constant (§4.1, lambda literal
    /// self-reference; §8 "Closures" requires the live instance so
    /// recursion keeps working after each call clones a fresh closure).
    SelfRef,
    /// A host-preloaded global (§4.1, "Symbol resolution", priority 1).
    Global(u32),
    /// Resolved nowhere — aborts compilation.
    Unresolved,
}

impl Compiler {
    fn resolve_ident(&self, name: &str) -> IdentLoc {
        let current = self.scopes.last().expect("no active scope");
        if let Some(&slot) = current.locals.get(name) {
            if !current.captured.contains(name) {
                return IdentLoc::Local(slot);
            }
        }
        if current.captured.contains(name) {
            return IdentLoc::Capture;
        }
        if current.self_name.as_deref() == Some(name) {
            return IdentLoc::SelfRef;
        }
        for scope in self.scopes[..self.scopes.len() - 1].iter().rev() {
            if scope.all_bound.contains(name) {
                return IdentLoc::Capture;
            }
        }
        if let Some(&idx) = self.globals.get(name) {
            return IdentLoc::Global(idx);
        }
        IdentLoc::Unresolved
    }

    /// Emit an expression as a plain rvalue (§4.1: every expression kind
    /// ultimately leaves one value on the stack).
    pub(crate) fn emit_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Number(n, _) => {
                let idx = self.number_const(*n)?;
                self.emit(Instruction::put_const(idx as u16));
            }
            Expr::Str(s, _) => {
                let idx = self.string_const(s)?;
                self.emit(Instruction::put_const(idx as u16));
            }
            Expr::Bool(b, _) => {
                let idx = if *b { self.true_const } else { self.false_const };
                self.emit(Instruction::put_const(idx as u16));
            }
            Expr::Null(_) => {
                let idx = self.null_const;
                self.emit(Instruction::put_const(idx as u16));
            }
            Expr::Undefined(_) => {
                let idx = self.undefined_const;
                self.emit(Instruction::put_const(idx as u16));
            }
            Expr::This(_) => self.emit(Instruction::bare(Opcode::PutThis)),
            Expr::Ident(name, span) => self.emit_ident(name, *span, false)?,
            Expr::Object(fields, _) => self.emit_object_literal(fields)?,
            Expr::Array(items, _) => self.emit_array_literal(items)?,
            Expr::Function { name, params, body, .. } => {
                let idx = self.compile_function_literal(name.as_deref(), params, body)?;
                self.emit(Instruction::make_closure(idx as u16));
            }
            Expr::Member { object, property, .. } => {
                self.emit_member_ref(object, property, false, false)?;
                self.emit(Instruction::bare(Opcode::Deref));
            }
            Expr::Unary { op, expr, span } => self.emit_unary(*op, expr, *span)?,
            Expr::Update { op, target, prefix, span } => self.emit_update(*op, target, *prefix, *span)?,
            Expr::Binary { op, left, right, .. } => self.emit_binary(*op, left, right)?,
            Expr::Logical { op, left, right, .. } => self.emit_logical(*op, left, right)?,
            Expr::Assign { target, value, span } => self.emit_assign(target, value, *span)?,
            Expr::Call { callee, args, .. } => self.emit_call(callee, args)?,
            Expr::New { callee, args, .. } => self.emit_new(callee, args)?,
        }
        Ok(())
    }

    /// Emit an expression as a `value-ref` lvalue: identifiers resolve
    /// to `ref_local`/`ref_upval` (no trailing `deref`), member accesses
    /// to `get_prop`. Used for assignment/update targets and for call
    /// callees, which need a reference rather than a dereferenced value
    /// so the VM can dispatch through it (§4.1, "Call").
    ///
    /// `allow_create` is threaded through to `get_prop`'s lvalue flag
    /// for member accesses (true for actual assignment/update targets,
    /// false for a call callee that merely needs to be read).
    pub(crate) fn emit_expr_ref(&mut self, expr: &Expr, allow_create: bool) -> Result<()> {
        match expr {
            Expr::Ident(name, span) => self.emit_ident(name, *span, true),
            Expr::Member { object, property, .. } => {
                self.emit_member_ref(object, property, allow_create, false)
            }
            other => Err(CompileError::UnsupportedConstruct {
                what: "non-lvalue expression used as an lvalue".into(),
                span: other.span(),
            }),
        }
    }

    fn emit_ident(&mut self, name: &str, span: djs_ast::Span, as_ref: bool) -> Result<()> {
        match self.resolve_ident(name) {
            IdentLoc::Local(slot) => {
                if as_ref {
                    self.emit(Instruction::ref_local(slot));
                } else {
                    self.emit(Instruction::dup_local(slot));
                }
            }
            IdentLoc::Capture => {
                let key = self.key_const(name)?;
                self.emit(Instruction::put_const(key as u16));
                self.emit(Instruction::bare(Opcode::RefUpval));
                if !as_ref {
                    self.emit(Instruction::bare(Opcode::Deref));
                }
            }
            IdentLoc::SelfRef => {
                self.emit(Instruction::put_self());
            }
            IdentLoc::Global(idx) => {
                self.emit(Instruction::put_const(idx as u16));
            }
            IdentLoc::Unresolved => {
                return Err(CompileError::UnresolvedSymbol {
                    name: name.to_string(),
                    span,
                });
            }
        }
        Ok(())
    }

    /// `{…}` (§4.1, "Object literal"): `put_obj_dud`, then for each
    /// field, re-duplicate the object (so `put_prop` can consume it
    /// alongside the key/value without losing the running result),
    /// push the key constant, the value, and `put_prop`.
    fn emit_object_literal(&mut self, fields: &[djs_ast::expr::ObjectField]) -> Result<()> {
        self.emit(Instruction::bare(Opcode::PutObjDud));
        for field in fields {
            self.emit(Instruction::bare(Opcode::Dup));
            let key = self.key_const(&field.key)?;
            self.emit(Instruction::put_const(key as u16));
            self.emit_expr(&field.value)?;
            self.emit(Instruction::bare(Opcode::PutProp));
        }
        Ok(())
    }

    /// `[…]` (§4.1, "Array literal"): emit each item then `make_arr n`.
    fn emit_array_literal(&mut self, items: &[Expr]) -> Result<()> {
        for item in items {
            self.emit_expr(item)?;
        }
        self.emit(Instruction::make_arr(items.len() as u16));
        Ok(())
    }

    /// `target.name` / `target[expr]` as a reference (§4.1, "Member
    /// access"). `is_call_target` duplicates the evaluated object so a
    /// copy survives `get_prop`'s consumption to serve as the callee's
    /// implicit `this` (§4.5's calling convention: the stack ends up
    /// `[..., this, callee_ref]`).
    fn emit_member_ref(
        &mut self,
        object: &Expr,
        property: &MemberProp,
        allow_create: bool,
        is_call_target: bool,
    ) -> Result<()> {
        self.emit_expr(object)?;
        if is_call_target {
            self.emit(Instruction::bare(Opcode::Dup));
        }
        match property {
            MemberProp::Static(name) => {
                let key = self.key_const(name)?;
                self.emit(Instruction::put_const(key as u16));
            }
            MemberProp::Computed(key_expr) => self.emit_expr(key_expr)?,
        }
        self.emit(Instruction::get_prop(allow_create));
        Ok(())
    }

    /// Prefix unary operators (§4.1, "Unary").
    fn emit_unary(&mut self, op: UnaryOp, operand: &Expr, _span: djs_ast::Span) -> Result<()> {
        match op {
            UnaryOp::Plus => {
                self.emit_expr(operand)?;
                self.emit(Instruction::bare(Opcode::Numify));
            }
            UnaryOp::Minus => {
                // No dedicated negate opcode; lower to `0 - x` through
                // the binary `sub` opcode (§4.5's table has no unary
                // arithmetic entries beyond `numify`).
                self.emit_expr(operand)?;
                let zero = self.number_const(0.0)?;
                self.emit(Instruction::put_const(zero as u16));
                self.emit(Instruction::bare(Opcode::Sub));
            }
            UnaryOp::Not => {
                self.emit_expr(operand)?;
                self.emit(Instruction::bare(Opcode::Not));
            }
            UnaryOp::Typeof => {
                self.emit_expr(operand)?;
                self.emit(Instruction::bare(Opcode::Typename));
            }
            UnaryOp::Void => {
                self.emit_expr(operand)?;
                self.emit(Instruction::bare(Opcode::Discard));
            }
        }
        Ok(())
    }

    /// `++x`/`--x`/`x++`/`x--` (§4.1, "Unary", and §4.5's `pre_inc`/
    /// `pre_dec`): push an lvalue, then let the opcode read-modify-write
    /// through it, picking old vs. new value per `prefix`.
    fn emit_update(&mut self, op: UpdateOp, target: &Expr, prefix: bool, span: djs_ast::Span) -> Result<()> {
        if !target.is_lvalue_shape() {
            return Err(CompileError::UnsupportedConstruct {
                what: "update operator on a non-lvalue".into(),
                span,
            });
        }
        self.emit_expr_ref(target, true)?;
        let op = match op {
            UpdateOp::Inc => Opcode::PreInc,
            UpdateOp::Dec => Opcode::PreDec,
        };
        self.emit(Instruction::with_arg(op, prefix as i16));
        Ok(())
    }

    /// Arithmetic/relational/equality binaries (§4.1, "Binary"):
    /// right-to-left emission (RHS then LHS) "to preserve associativity
    /// for future right-associative operators"; `+` concatenates
    /// instead of adding when either side is statically known to be a
    /// string.
    fn emit_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<()> {
        if op == BinaryOp::Add && (is_stringish(left) || is_stringish(right)) {
            self.emit_expr(right)?;
            self.emit_expr(left)?;
            self.emit(Instruction::bare(Opcode::Strcat));
            return Ok(());
        }
        self.emit_expr(right)?;
        self.emit_expr(left)?;
        let opcode = match op {
            BinaryOp::Add => Opcode::Add,
            BinaryOp::Sub => Opcode::Sub,
            BinaryOp::Mul => Opcode::Mul,
            BinaryOp::Div => Opcode::Div,
            BinaryOp::Mod => Opcode::Mod,
            BinaryOp::StrictEq => Opcode::StrictEq,
            BinaryOp::NotEq => Opcode::Ne,
            BinaryOp::Lt => Opcode::Lt,
            BinaryOp::Le => Opcode::Le,
            BinaryOp::Gt => Opcode::Gt,
            BinaryOp::Ge => Opcode::Ge,
        };
        self.emit(Instruction::bare(opcode));
        Ok(())
    }

    /// `&&`/`||` (§4.1, "Binary", logical short-circuit): left is
    /// evaluated once and kept as the short-circuit result; the
    /// right-hand side is only evaluated (and replaces it) when the
    /// left doesn't already decide the outcome.
    fn emit_logical(&mut self, op: LogicalOp, left: &Expr, right: &Expr) -> Result<()> {
        self.emit_expr(left)?;
        self.emit(Instruction::bare(Opcode::Dup));
        let branch_site = self.pos();
        match op {
            LogicalOp::And => self.emit(Instruction::jump_else(0)),
            LogicalOp::Or => self.emit(Instruction::jump_if(0)),
        }
        self.emit(Instruction::bare(Opcode::Pop));
        self.emit_expr(right)?;
        let end = self.pos();
        self.patch_jump(branch_site, end);
        Ok(())
    }

    /// `lvalue = rvalue` (§4.1, "Assignment"): emit the lvalue, then the
    /// rvalue, then `emplace`.
    fn emit_assign(&mut self, target: &Expr, value: &Expr, span: djs_ast::Span) -> Result<()> {
        if !target.is_lvalue_shape() {
            return Err(CompileError::UnsupportedConstruct {
                what: "assignment to a non-lvalue".into(),
                span,
            });
        }
        self.emit_expr_ref(target, true)?;
        self.emit_expr(value)?;
        self.emit(Instruction::bare(Opcode::Emplace));
        Ok(())
    }

    /// `callee(args…)` (§4.1, "Call"): arguments precede the callee
    /// (§5's evaluation order), and the callee's own emission supplies
    /// `this` — the duplicated member target for method dispatch, or
    /// an explicit `undefined` for a plain function call.
    fn emit_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<()> {
        for arg in args {
            self.emit_expr(arg)?;
        }
        let has_this = matches!(callee, Expr::Member { .. });
        if let Expr::Member { object, property, .. } = callee {
            self.emit_member_ref(object, property, false, true)?;
        } else {
            let undef = self.undefined_const;
            self.emit(Instruction::put_const(undef as u16));
            self.emit_expr_ref(callee, false)?;
        }
        self.emit(Instruction::object_call(args.len() as u16, has_this));
        Ok(())
    }

    /// `new callee(args…)` (§4.1, "Unary", `new`): no explicit `this` is
    /// pushed — the VM constructs the new object itself from the
    /// callee's `prototype` property.
    fn emit_new(&mut self, callee: &Expr, args: &[Expr]) -> Result<()> {
        for arg in args {
            self.emit_expr(arg)?;
        }
        self.emit_expr_ref(callee, false)?;
        self.emit(Instruction::ctor_call(args.len() as u16));
        Ok(())
    }
}

/// Static, syntactic "is this a string" check used to pick `strcat`
/// over `add` for `+` (§4.1: "If any operand of `+` is known to be
/// string-typed, emit `strcat` instead of `add`"). Deliberately the
/// "looser" rule from the Design Notes Open Question: only string
/// literals and `+` expressions transitively built from them are
/// recognized — a runtime string value flowing through a variable or
/// call result is not statically visible here and falls back to
/// numeric `add` (see `DESIGN.md`).
fn is_stringish(expr: &Expr) -> bool {
    match expr {
        Expr::Str(..) => true,
        Expr::Binary {
            op: BinaryOp::Add,
            left,
            right,
            ..
        } => is_stringish(left) || is_stringish(right),
        _ => false,
    }
}
