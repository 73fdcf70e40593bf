//! Opcode enumeration for the djs stack machine.

use serde::{Deserialize, Serialize};

/// Every opcode the virtual machine understands.
///
/// The machine is stack-oriented: operands are pushed and popped rather than
/// addressed through virtual registers. Each [`crate::instruction::Instruction`]
/// pairs an opcode with up to two `i16` arguments whose meaning depends on
/// the opcode (see the doc comment on each variant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// Do nothing. Used as a placeholder for omitted `for` sub-clauses.
    Nop = 0x00,
    /// Duplicate the top of the stack.
    Dup = 0x01,
    /// Drop the top of the stack.
    Pop = 0x02,

    // ==================== Constants & locals ====================
    /// Push `consts[args[0]]`.
    PutConst = 0x10,
    /// Push the local at slot `args[0]` by value.
    DupLocal = 0x11,
    /// Push a value-ref (lvalue) to the local at slot `args[0]`.
    RefLocal = 0x12,
    /// Pop a key, store a value-ref to the capture-env property named by
    /// that key (lvalue of a closure write).
    StoreUpval = 0x13,
    /// Pop a key, push a value-ref to the capture-env property named by
    /// that key (lvalue/rvalue root of a closure read).
    RefUpval = 0x14,
    /// Replace a value-ref on top of the stack with the value it points to.
    Deref = 0x15,
    /// Pop `rhs` then an lvalue; assign `rhs` through the lvalue and push
    /// `rhs` back (assignment is itself an expression).
    Emplace = 0x16,
    /// Clone the lambda template at `consts[args[0]]`, binding the clone's
    /// defining environment to the current frame's capture-env, and push
    /// the clone (closure creation).
    MakeClosure = 0x17,
    /// Push the heap id of the lambda currently executing (`frame.callee_id`),
    /// for a named function expression's self-reference.
    PutSelf = 0x18,

    // ==================== Objects & arrays ====================
    /// Push a freshly-allocated empty object (`Object.prototype`-linked).
    PutObjDud = 0x20,
    /// Pop `args[0]` items and push a new Array containing them in order.
    MakeArr = 0x21,
    /// Push the prototype-key-marker sentinel.
    PutProtoKey = 0x22,
    /// Push the current frame's `this`.
    PutThis = 0x23,
    /// Pop a key, pop a target; push a value-ref to the property. `args[0]`
    /// is nonzero when this access occurs in lvalue (assignable) context.
    GetProp = 0x24,
    /// Pop a value, a key, and a target object; store the value at that key.
    PutProp = 0x25,
    /// Pop a key and a target object; delete that property, push the
    /// boolean result.
    DelProp = 0x26,

    // ==================== Unary helpers ====================
    /// Convert the top of stack to a number (unary `+`).
    Numify = 0x30,
    /// Pop two values, push their string concatenation (string `+`).
    Strcat = 0x31,
    /// Replace the top of stack with its `typeof` name string.
    Typename = 0x32,
    /// Pop the top of stack and push `undefined` (the `void` operator).
    Discard = 0x33,
    /// Pre/post increment through an lvalue already on the stack.
    PreInc = 0x34,
    /// Pre/post decrement through an lvalue already on the stack.
    PreDec = 0x35,
    /// Logical/bitwise negation used for `!`.
    Not = 0x36,

    // ==================== Arithmetic ====================
    /// `lhs % rhs`.
    Mod = 0x40,
    /// `lhs * rhs`.
    Mul = 0x41,
    /// `lhs / rhs`.
    Div = 0x42,
    /// `lhs + rhs` (numeric).
    Add = 0x43,
    /// `lhs - rhs`.
    Sub = 0x44,

    // ==================== Comparisons ====================
    /// Pop the top of stack; push `true` if it is falsy.
    TestFalsy = 0x50,
    /// `lhs === rhs`.
    StrictEq = 0x51,
    /// `lhs !== rhs`.
    Ne = 0x52,
    /// `lhs < rhs`.
    Lt = 0x53,
    /// `lhs <= rhs`.
    Le = 0x54,
    /// `lhs > rhs`.
    Gt = 0x55,
    /// `lhs >= rhs`.
    Ge = 0x56,

    // ==================== Control flow ====================
    /// Unconditional pc-relative jump by `args[0]`.
    Jump = 0x60,
    /// Pop the top of stack; if truthy, jump by `args[0]`.
    JumpIf = 0x61,
    /// Pop the top of stack; if falsy, jump by `args[0]`.
    JumpElse = 0x62,

    // ==================== Calls ====================
    /// Invoke the callee value-ref below `args[0]` arguments.
    /// `args[1]` is nonzero when an implicit `this` (member dispatch) is
    /// already in place below the callee.
    ObjectCall = 0x70,
    /// Like `ObjectCall`, but constructs a new object as `this` (`new`).
    CtorCall = 0x71,
    /// Pop the return value (unless `args[0]` is nonzero, meaning
    /// "implicit return": push `undefined`, or the constructed `this` if
    /// the frame is a constructor call); unwind the current frame.
    Ret = 0x72,

    // ==================== Exceptions ====================
    /// Pop the top of stack and raise it as the active exception.
    /// `args[0]` is nonzero when a try-region is active in this chunk.
    Throw = 0x80,
    /// Bind the active exception to the local at slot `args[0]` and resume
    /// normal execution (the catch prologue).
    Catch = 0x81,

    /// Stop the virtual machine with status `args[0]`.
    Halt = 0x90,
}

impl Opcode {
    /// Decode a raw byte into an opcode.
    pub fn from_u8(byte: u8) -> Option<Self> {
        use Opcode::*;
        Some(match byte {
            0x00 => Nop,
            0x01 => Dup,
            0x02 => Pop,
            0x10 => PutConst,
            0x11 => DupLocal,
            0x12 => RefLocal,
            0x13 => StoreUpval,
            0x14 => RefUpval,
            0x15 => Deref,
            0x16 => Emplace,
            0x17 => MakeClosure,
            0x18 => PutSelf,
            0x20 => PutObjDud,
            0x21 => MakeArr,
            0x22 => PutProtoKey,
            0x23 => PutThis,
            0x24 => GetProp,
            0x25 => PutProp,
            0x26 => DelProp,
            0x30 => Numify,
            0x31 => Strcat,
            0x32 => Typename,
            0x33 => Discard,
            0x34 => PreInc,
            0x35 => PreDec,
            0x36 => Not,
            0x40 => Mod,
            0x41 => Mul,
            0x42 => Div,
            0x43 => Add,
            0x44 => Sub,
            0x50 => TestFalsy,
            0x51 => StrictEq,
            0x52 => Ne,
            0x53 => Lt,
            0x54 => Le,
            0x55 => Gt,
            0x56 => Ge,
            0x60 => Jump,
            0x61 => JumpIf,
            0x62 => JumpElse,
            0x70 => ObjectCall,
            0x71 => CtorCall,
            0x72 => Ret,
            0x80 => Throw,
            0x81 => Catch,
            0x90 => Halt,
            _ => return None,
        })
    }

    /// The mnemonic used by the disassembler.
    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Nop => "nop",
            Dup => "dup",
            Pop => "pop",
            PutConst => "put_const",
            DupLocal => "dup_local",
            RefLocal => "ref_local",
            StoreUpval => "store_upval",
            RefUpval => "ref_upval",
            Deref => "deref",
            Emplace => "emplace",
            MakeClosure => "make_closure",
            PutSelf => "put_self",
            PutObjDud => "put_obj_dud",
            MakeArr => "make_arr",
            PutProtoKey => "put_proto_key",
            PutThis => "put_this",
            GetProp => "get_prop",
            PutProp => "put_prop",
            DelProp => "del_prop",
            Numify => "numify",
            Strcat => "strcat",
            Typename => "typename",
            Discard => "discard",
            PreInc => "pre_inc",
            PreDec => "pre_dec",
            Not => "not",
            Mod => "mod",
            Mul => "mul",
            Div => "div",
            Add => "add",
            Sub => "sub",
            TestFalsy => "test_falsy",
            StrictEq => "strict_eq",
            Ne => "ne",
            Lt => "lt",
            Le => "le",
            Gt => "gt",
            Ge => "ge",
            Jump => "jump",
            JumpIf => "jump_if",
            JumpElse => "jump_else",
            ObjectCall => "object_call",
            CtorCall => "ctor_call",
            Ret => "ret",
            Throw => "throw",
            Catch => "catch",
            Halt => "halt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_every_opcode_byte() {
        let all = [
            Opcode::Nop,
            Opcode::Dup,
            Opcode::Pop,
            Opcode::PutConst,
            Opcode::DupLocal,
            Opcode::RefLocal,
            Opcode::StoreUpval,
            Opcode::RefUpval,
            Opcode::Deref,
            Opcode::Emplace,
            Opcode::MakeClosure,
            Opcode::PutSelf,
            Opcode::PutObjDud,
            Opcode::MakeArr,
            Opcode::PutProtoKey,
            Opcode::PutThis,
            Opcode::GetProp,
            Opcode::PutProp,
            Opcode::DelProp,
            Opcode::Numify,
            Opcode::Strcat,
            Opcode::Typename,
            Opcode::Discard,
            Opcode::PreInc,
            Opcode::PreDec,
            Opcode::Not,
            Opcode::Mod,
            Opcode::Mul,
            Opcode::Div,
            Opcode::Add,
            Opcode::Sub,
            Opcode::TestFalsy,
            Opcode::StrictEq,
            Opcode::Ne,
            Opcode::Lt,
            Opcode::Le,
            Opcode::Gt,
            Opcode::Ge,
            Opcode::Jump,
            Opcode::JumpIf,
            Opcode::JumpElse,
            Opcode::ObjectCall,
            Opcode::CtorCall,
            Opcode::Ret,
            Opcode::Throw,
            Opcode::Catch,
            Opcode::Halt,
        ];
        for op in all {
            assert_eq!(Opcode::from_u8(op as u8), Some(op));
        }
    }

    #[test]
    fn rejects_unknown_byte() {
        assert_eq!(Opcode::from_u8(0xff), None);
    }
}
