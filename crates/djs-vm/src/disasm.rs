//! Static disassembler (§4.8): renders a [`Program`] as entry id, constant
//! pool, and a linear per-chunk instruction listing, without needing a
//! live [`crate::Vm`] — everything here is symbolic, exactly what the
//! compiler handed the VM before boot resolved any of it against a heap.

use std::fmt::Write as _;

use djs_bytecode::{ConstSlot, Instruction, Opcode, Program};

/// Render `program` as human-readable text for the CLI's `-d` flag.
pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "entry_chunk_id: {}", program.entry_chunk_id);
    let _ = writeln!(out, "constants ({}):", program.consts.len());
    for (i, slot) in program.consts.iter().enumerate() {
        let _ = writeln!(out, "  #{i}: {}", render_const(slot));
    }
    let _ = writeln!(out, "chunks: {}", program.chunk_count());
    for chunk_id in 0..program.chunk_count() as u32 {
        let Ok((start, end)) = program.chunk_range(chunk_id) else {
            continue;
        };
        let _ = writeln!(out, "chunk {chunk_id} [{start}, {end}):");
        for pc in start..end {
            let instr = program.code[pc];
            let _ = writeln!(out, "  {pc:>6}: {}", render_instr(pc as u32, instr));
        }
    }
    out
}

fn render_const(slot: &ConstSlot) -> String {
    match slot {
        ConstSlot::Undefined => "undefined".to_string(),
        ConstSlot::Null => "null".to_string(),
        ConstSlot::NaN => "NaN".to_string(),
        ConstSlot::Bool(b) => b.to_string(),
        ConstSlot::Int(i) => i.to_string(),
        ConstSlot::Float(f) => f.to_string(),
        ConstSlot::Str(s) => format!("{s:?}"),
        ConstSlot::Prelude(idx) => format!("prelude#{idx}"),
    }
}

fn render_instr(pc: u32, instr: Instruction) -> String {
    use Opcode::*;
    match instr.op {
        Jump | JumpIf | JumpElse => {
            let target = pc as i64 + instr.offset() as i64;
            format!("{} -> {target}", instr.op.mnemonic())
        }
        Nop | Dup | Pop | PutObjDud | PutProtoKey | PutThis | Numify | Strcat | Typename
        | Discard | Not | Mod | Mul | Div | Add | Sub | TestFalsy | StrictEq | Ne | Lt | Le | Gt
        | Ge | Deref | PutSelf => instr.op.mnemonic().to_string(),
        PutConst | DupLocal | RefLocal | StoreUpval | RefUpval | MakeArr | GetProp | DelProp
        | PreInc | PreDec | CtorCall | Ret | Throw | Catch | Halt | MakeClosure => {
            format!("{} {}", instr.op.mnemonic(), instr.args[0])
        }
        ObjectCall | PutProp | Emplace => {
            format!("{} {} {}", instr.op.mnemonic(), instr.args[0], instr.args[1])
        }
    }
}
