//! # djs bytecode
//!
//! Defines the compiled-program format produced by `djs-compiler` and
//! consumed by `djs-vm`: opcodes, instructions, the constant pool, and the
//! chunk-offset layout described in the system's §3 data model.
//!
//! This crate knows nothing about the heap, GC, or runtime value
//! representation — constants that must become heap objects (strings,
//! lambdas, natives) are recorded symbolically via [`constant::ConstSlot`]
//! and resolved by the VM when it seeds its heap at startup.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constant;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;

pub use constant::{ConstSlot, ConstantPool};
pub use error::BytecodeError;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use program::{BasePrototypes, PreludeObject, Program, ProgramBuilder, PropertyWire, TryRegion};
