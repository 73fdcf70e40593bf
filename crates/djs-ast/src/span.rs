//! Source locations: which file, and which byte range within it.

/// Identifies one source text among the translation unit's members
/// (§6, "Source texts: mapping from source-id to its full text").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u32);

/// A byte range `[start, end)` within the text named by a `SourceId`,
/// used to render a snippet when the compiler or parser reports an
/// error (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: u32,
    /// Byte offset one past the last character.
    pub end: u32,
}

impl Span {
    /// Build a span from a `[start, end)` byte range.
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A zero-width span at the start of the file, used for synthesized
    /// nodes (e.g. the implicit `return undefined` appended to a body).
    pub fn synthetic() -> Self {
        Self { start: 0, end: 0 }
    }
}
