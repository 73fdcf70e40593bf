//! The top-level "parsed translation unit" the compiler's public entry
//! point accepts (§6).

use crate::span::SourceId;
use crate::stmt::Stmt;

/// One parsed source file: its own statements, tagged with the
/// `SourceId` the host used to register its text.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// The originating file name, for error messages.
    pub filename: String,
    /// This unit's id in the host's source-text mapping.
    pub source_id: SourceId,
    /// The file's top-level statements.
    pub body: Vec<Stmt>,
}

/// An ordered sequence of parsed source files, exactly the "Compiler
/// input" shape from §6.
#[derive(Debug, Clone, Default)]
pub struct TranslationUnit {
    /// The member source files, in compile order. The first unit's body
    /// becomes the implicit top-level "main" chunk (§3, "Program").
    pub units: Vec<SourceUnit>,
}

impl TranslationUnit {
    /// Build a translation unit from a single source file — the common
    /// case for this system's CLI (`-r PATH`).
    pub fn single(unit: SourceUnit) -> Self {
        Self { units: vec![unit] }
    }
}
