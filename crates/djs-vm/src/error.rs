//! VM error taxonomy (§6, "VM status codes"), mirrored 1:1 onto
//! [`crate::status::VmStatus`] so a caller can match on either the typed
//! error or the flat status code without re-deriving one from the other.

use thiserror::Error;

use crate::status::VmStatus;

/// Internal VM errors. Every variant maps onto exactly one
/// [`VmStatus`] via [`VmError::status`].
#[derive(Debug, Error)]
pub enum VmError {
    /// Heap prelude materialization or native-registry resolution failed
    /// before the first instruction ran.
    #[error("setup error: {0}")]
    Setup(String),
    /// An instruction's opcode/operand combination was invalid for the
    /// current VM state (e.g. `catch` outside a guard region).
    #[error("opcode error: {0}")]
    Opcode(String),
    /// The operand stack underflowed, overflowed, or a `sbp`-relative
    /// slot was out of range.
    #[error("stack error: {0}")]
    Stack(String),
    /// The heap refused an allocation or returned a dangling handle.
    #[error("heap error: {0}")]
    Heap(String),
    /// A call target was not callable, or its calling convention was
    /// violated (wrong chunk id, missing prelude template, etc).
    #[error("function error: {0}")]
    Function(String),
    /// An operation was attempted on a value that does not support it
    /// (e.g. member access on a non-object).
    #[error("bad operation: {0}")]
    BadOperation(String),
    /// A heap allocation exceeded the configured object-pool capacity.
    #[error("bad heap allocation: {0}")]
    BadHeapAlloc(String),
    /// Bytecode-level error surfaced from `djs-bytecode`.
    #[error("bytecode error: {0}")]
    Bytecode(#[from] djs_bytecode::BytecodeError),
    /// A script `throw`ed and no enclosing `try`/`catch` region handled
    /// it anywhere on the call stack. Carries the exception's display
    /// string (§7) so an embedder can report it without re-touching the
    /// heap after the VM has halted.
    #[error("unhandled exception: {0}")]
    UnhandledException(String),
}

impl VmError {
    /// The flat status code a host embedder inspects (§6).
    pub fn status(&self) -> VmStatus {
        match self {
            VmError::Setup(_) => VmStatus::SetupErr,
            VmError::Opcode(_) => VmStatus::OpcodeErr,
            VmError::Stack(_) => VmStatus::StackErr,
            VmError::Heap(_) => VmStatus::HeapErr,
            VmError::Function(_) => VmStatus::FuncErr,
            VmError::BadOperation(_) => VmStatus::BadOperation,
            VmError::BadHeapAlloc(_) => VmStatus::BadHeapAlloc,
            VmError::Bytecode(_) => VmStatus::OpcodeErr,
            VmError::UnhandledException(_) => VmStatus::UnhandledException,
        }
    }
}

/// Result type threaded through the execution loop.
pub type Result<T> = std::result::Result<T, VmError>;
