//! Statement emission (§4.1, "Statement emission"). Unlike expressions,
//! a statement leaves the operand stack exactly as it found it — every
//! arm here is responsible for discarding whatever value its
//! expressions produced.

use djs_ast::{Expr, Stmt};
use djs_bytecode::Instruction;

use crate::error::{CompileError, Result};
use crate::scope::LoopFrame;
use crate::Compiler;

impl Compiler {
    pub(crate) fn emit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::VarDecl { name, init, span } => self.emit_var_decl(name, init, *span),
            // Already bound by the hoisting prologue (§4.1); nothing to
            // emit when the declaration is encountered in source order.
            Stmt::FunctionDecl { .. } => Ok(()),
            Stmt::Expr(e) => {
                self.emit_expr(e)?;
                self.emit(Instruction::bare(djs_bytecode::Opcode::Pop));
                Ok(())
            }
            Stmt::Block(stmts, _) => {
                for s in stmts {
                    self.emit_stmt(s)?;
                }
                Ok(())
            }
            Stmt::If { cond, then_branch, else_branch, .. } => {
                self.emit_if(cond, then_branch, else_branch.as_deref())
            }
            Stmt::While { cond, body, .. } => self.emit_while(cond, body),
            Stmt::For { init, cond, update, body, .. } => {
                self.emit_for(init.as_deref(), cond.as_ref(), update.as_ref(), body)
            }
            Stmt::Break(span) => self.emit_break(*span),
            Stmt::Continue(span) => self.emit_continue(*span),
            Stmt::Return(value, _) => self.emit_return(value.as_ref()),
            Stmt::Throw(e, _) => self.emit_throw(e),
            Stmt::Try { block, catch_param, handler, .. } => {
                self.emit_try(block, catch_param, handler)
            }
        }
    }

    /// `var name [= init];` (§4.1): the binding itself was already
    /// created (as `undefined`) by the hoisting prologue; an initializer
    /// here is just a plain assignment, evaluated as a statement.
    fn emit_var_decl(&mut self, name: &str, init: &Option<Expr>, span: djs_ast::Span) -> Result<()> {
        let Some(init) = init else { return Ok(()) };
        let target = Expr::Ident(name.to_string(), span);
        self.emit_expr_ref(&target, true)?;
        self.emit_expr(init)?;
        self.emit(Instruction::bare(djs_bytecode::Opcode::Emplace));
        self.emit(Instruction::bare(djs_bytecode::Opcode::Pop));
        Ok(())
    }

    /// `if (cond) then [else else_]` (§4.1).
    fn emit_if(&mut self, cond: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) -> Result<()> {
        self.emit_expr(cond)?;
        let else_site = self.pos();
        self.emit(Instruction::jump_else(0));
        self.emit_stmt(then_branch)?;
        match else_branch {
            Some(else_stmt) => {
                let skip_else_site = self.pos();
                self.emit(Instruction::jump(0));
                let else_pos = self.pos();
                self.patch_jump(else_site, else_pos);
                self.emit_stmt(else_stmt)?;
                let end = self.pos();
                self.patch_jump(skip_else_site, end);
            }
            None => {
                let end = self.pos();
                self.patch_jump(else_site, end);
            }
        }
        Ok(())
    }

    /// `while (cond) body` (§4.1): `continue` re-tests the condition;
    /// `break` exits past the loop entirely.
    fn emit_while(&mut self, cond: &Expr, body: &Stmt) -> Result<()> {
        self.current_scope_mut().loop_stack.push(LoopFrame::default());
        let test_pos = self.pos();
        self.emit_expr(cond)?;
        let exit_site = self.pos();
        self.emit(Instruction::jump_else(0));
        self.emit_stmt(body)?;
        let back_site = self.pos();
        self.emit(Instruction::jump(0));
        self.patch_jump(back_site, test_pos);
        let end = self.pos();
        self.patch_jump(exit_site, end);
        self.finish_loop(end, test_pos);
        Ok(())
    }

    /// `for ([init]; [cond]; [update]) body` (§4.1). A missing
    /// sub-clause lowers to a literal `nop`, per the Design Notes Open
    /// Question decision, rather than being silently omitted —
    /// `continue` still runs the update clause before re-testing the
    /// condition, matching ordinary `for`-loop semantics.
    fn emit_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
    ) -> Result<()> {
        match init {
            Some(s) => self.emit_stmt(s)?,
            None => self.emit(Instruction::bare(djs_bytecode::Opcode::Nop)),
        }

        self.current_scope_mut().loop_stack.push(LoopFrame::default());
        let test_pos = self.pos();
        let exit_site = match cond {
            Some(c) => {
                self.emit_expr(c)?;
                let site = self.pos();
                self.emit(Instruction::jump_else(0));
                Some(site)
            }
            None => {
                self.emit(Instruction::bare(djs_bytecode::Opcode::Nop));
                None
            }
        };

        self.emit_stmt(body)?;

        let continue_target = self.pos();
        match update {
            Some(u) => {
                self.emit_expr(u)?;
                self.emit(Instruction::bare(djs_bytecode::Opcode::Pop));
            }
            None => self.emit(Instruction::bare(djs_bytecode::Opcode::Nop)),
        }

        let back_site = self.pos();
        self.emit(Instruction::jump(0));
        self.patch_jump(back_site, test_pos);

        let end = self.pos();
        if let Some(site) = exit_site {
            self.patch_jump(site, end);
        }
        self.finish_loop(end, continue_target);
        Ok(())
    }

    /// Pop the innermost loop frame, patching every collected `break`
    /// jump to `end` and every `continue` jump to `continue_target`.
    fn finish_loop(&mut self, end: usize, continue_target: usize) {
        let frame = self
            .current_scope_mut()
            .loop_stack
            .pop()
            .expect("loop frame pushed by caller");
        for site in frame.break_jumps {
            self.patch_jump(site, end);
        }
        for site in frame.continue_jumps {
            self.patch_jump(site, continue_target);
        }
    }

    fn emit_break(&mut self, span: djs_ast::Span) -> Result<()> {
        if self.current_scope_mut().loop_stack.is_empty() {
            return Err(CompileError::UnsupportedConstruct {
                what: "break outside a loop".into(),
                span,
            });
        }
        let site = self.pos();
        self.emit(Instruction::jump(0));
        self.current_scope_mut()
            .loop_stack
            .last_mut()
            .expect("checked above")
            .break_jumps
            .push(site);
        Ok(())
    }

    fn emit_continue(&mut self, span: djs_ast::Span) -> Result<()> {
        if self.current_scope_mut().loop_stack.is_empty() {
            return Err(CompileError::UnsupportedConstruct {
                what: "continue outside a loop".into(),
                span,
            });
        }
        let site = self.pos();
        self.emit(Instruction::jump(0));
        self.current_scope_mut()
            .loop_stack
            .last_mut()
            .expect("checked above")
            .continue_jumps
            .push(site);
        Ok(())
    }

    /// `return [value];` (§4.1, and `ret`'s `implicit` flag, §4.5): a
    /// bare `return` and falling off the end of a function body both
    /// compile to `ret(true)`.
    fn emit_return(&mut self, value: Option<&Expr>) -> Result<()> {
        match value {
            Some(e) => {
                self.emit_expr(e)?;
                self.emit(Instruction::ret(false));
            }
            None => self.emit(Instruction::ret(true)),
        }
        Ok(())
    }

    fn emit_throw(&mut self, value: &Expr) -> Result<()> {
        self.emit_expr(value)?;
        let in_try = self.current_scope_mut().try_depth > 0;
        self.emit(Instruction::throw(in_try));
        Ok(())
    }

    /// `try { block } catch (param) { handler }` (§4.1): the block's own
    /// span becomes a guard region (chunk-relative, rebased by
    /// `ProgramBuilder::build`); normal completion of the block jumps
    /// past the catch prologue entirely.
    ///
    /// The catch parameter is bound to a fresh local slot rather than
    /// run through the hoisting/capture analysis that covers `var` and
    /// function declarations — a nested closure that captures a catch
    /// parameter is not supported by this subset (see `DESIGN.md`).
    fn emit_try(&mut self, block: &[Stmt], catch_param: &str, handler: &[Stmt]) -> Result<()> {
        let chunk_id = self.current_scope_mut().chunk_id;
        let start = self.pos();
        let locals_depth = self.current_scope_mut().next_slot as u32;

        self.current_scope_mut().try_depth += 1;
        for s in block {
            self.emit_stmt(s)?;
        }
        self.current_scope_mut().try_depth -= 1;
        let end = self.pos();

        let skip_site = self.pos();
        self.emit(Instruction::jump(0));

        let catch_pc = self.pos();
        let catch_slot = self.alloc_slot(catch_param);
        self.emit(Instruction::catch(catch_slot));
        for s in handler {
            self.emit_stmt(s)?;
        }

        let after = self.pos();
        self.patch_jump(skip_site, after);
        self.builder
            .push_try_region(chunk_id, start as u32, end as u32, catch_pc as u32, locals_depth);
        Ok(())
    }
}
