//! Heap errors.

use thiserror::Error;

/// Errors raised by the heap pool.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GcError {
    /// The heap has no free slots and is at its configured capacity.
    #[error("heap exhausted (capacity {0})")]
    HeapFull(usize),
}

/// Result type for heap operations.
pub type Result<T> = std::result::Result<T, GcError>;
