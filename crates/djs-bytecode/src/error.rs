//! Errors produced while assembling or validating a [`crate::program::Program`].

use thiserror::Error;

/// Errors raised while building a bytecode program.
#[derive(Debug, Error)]
pub enum BytecodeError {
    /// The constant pool grew past `u16::MAX` entries.
    #[error("too many constants (max {})", u16::MAX)]
    TooManyConstants,

    /// A chunk offset table was malformed (missing terminator, etc).
    #[error("malformed chunk offset table")]
    MalformedOffsets,

    /// A chunk id referenced a chunk that does not exist.
    #[error("invalid chunk id {0}")]
    InvalidChunkId(u32),
}

/// Result type for bytecode assembly operations.
pub type Result<T> = std::result::Result<T, BytecodeError>;
