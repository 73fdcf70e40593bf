//! A single bytecode instruction.

use serde::{Deserialize, Serialize};

use crate::opcode::Opcode;

/// One instruction: an opcode plus two `i16` arguments.
///
/// `args` is deliberately untyped at this layer — what each slot means
/// (a constant index, a local slot, a pc-relative offset, an argument
/// count, a flag bit...) depends on `op`. The constructors below name
/// the intent; the VM interprets raw fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// The opcode to execute.
    pub op: Opcode,
    /// Opcode-dependent operands.
    pub args: [i16; 2],
}

impl Instruction {
    /// Build a bare instruction with no operands.
    pub const fn bare(op: Opcode) -> Self {
        Self { op, args: [0, 0] }
    }

    /// Build an instruction with a single operand in `args[0]`.
    pub const fn with_arg(op: Opcode, arg0: i16) -> Self {
        Self { op, args: [arg0, 0] }
    }

    /// Build an instruction with both operands set.
    pub const fn with_args(op: Opcode, arg0: i16, arg1: i16) -> Self {
        Self { op, args: [arg0, arg1] }
    }

    /// `put_const c`
    pub const fn put_const(index: u16) -> Self {
        Self::with_arg(Opcode::PutConst, index as i16)
    }

    /// `dup_local s`
    pub const fn dup_local(slot: u16) -> Self {
        Self::with_arg(Opcode::DupLocal, slot as i16)
    }

    /// `ref_local s`
    pub const fn ref_local(slot: u16) -> Self {
        Self::with_arg(Opcode::RefLocal, slot as i16)
    }

    /// `make_closure c`
    pub const fn make_closure(index: u16) -> Self {
        Self::with_arg(Opcode::MakeClosure, index as i16)
    }

    /// `put_self`
    pub const fn put_self() -> Self {
        Self::bare(Opcode::PutSelf)
    }

    /// `get_prop lv?`
    pub const fn get_prop(lvalue: bool) -> Self {
        Self::with_arg(Opcode::GetProp, lvalue as i16)
    }

    /// `make_arr n`
    pub const fn make_arr(count: u16) -> Self {
        Self::with_arg(Opcode::MakeArr, count as i16)
    }

    /// `jump o` with a placeholder offset, to be back-patched.
    pub const fn jump(offset: i16) -> Self {
        Self::with_arg(Opcode::Jump, offset)
    }

    /// `jump_if o`
    pub const fn jump_if(offset: i16) -> Self {
        Self::with_arg(Opcode::JumpIf, offset)
    }

    /// `jump_else o`
    pub const fn jump_else(offset: i16) -> Self {
        Self::with_arg(Opcode::JumpElse, offset)
    }

    /// `object_call argc has_this`
    pub const fn object_call(argc: u16, has_this: bool) -> Self {
        Self::with_args(Opcode::ObjectCall, argc as i16, has_this as i16)
    }

    /// `ctor_call argc`
    pub const fn ctor_call(argc: u16) -> Self {
        Self::with_arg(Opcode::CtorCall, argc as i16)
    }

    /// `ret implicit?`
    pub const fn ret(implicit: bool) -> Self {
        Self::with_arg(Opcode::Ret, implicit as i16)
    }

    /// `throw in_try?`
    pub const fn throw(in_try: bool) -> Self {
        Self::with_arg(Opcode::Throw, in_try as i16)
    }

    /// `catch` targeting a local slot.
    pub const fn catch(slot: u16) -> Self {
        Self::with_arg(Opcode::Catch, slot as i16)
    }

    /// `halt status`
    pub const fn halt(status: i16) -> Self {
        Self::with_arg(Opcode::Halt, status)
    }

    /// First operand as an unsigned index (constant/local/slot position).
    #[inline]
    pub fn u0(self) -> u16 {
        self.args[0] as u16
    }

    /// Second operand as an unsigned value.
    #[inline]
    pub fn u1(self) -> u16 {
        self.args[1] as u16
    }

    /// First operand treated as a signed pc-relative offset.
    #[inline]
    pub fn offset(self) -> i32 {
        self.args[0] as i32
    }

    /// Patch the jump offset of a `jump`/`jump_if`/`jump_else` instruction
    /// once the target address is known.
    pub fn patch_offset(&mut self, offset: i32) {
        debug_assert!(
            matches!(self.op, Opcode::Jump | Opcode::JumpIf | Opcode::JumpElse),
            "patch_offset called on a non-jump instruction"
        );
        self.args[0] = offset as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_expected_fields() {
        let ins = Instruction::put_const(7);
        assert_eq!(ins.op, Opcode::PutConst);
        assert_eq!(ins.u0(), 7);

        let ins = Instruction::object_call(3, true);
        assert_eq!(ins.u0(), 3);
        assert_eq!(ins.u1(), 1);
    }

    #[test]
    fn patch_offset_rewrites_jump_target() {
        let mut ins = Instruction::jump(0);
        ins.patch_offset(42);
        assert_eq!(ins.offset(), 42);
    }
}
