//! Parser errors (§7, "Compile errors" — the parser shares the
//! compiler's snippet-printing failure model since it sits in the same
//! front-end pipeline).

use djs_ast::Span;
use thiserror::Error;

/// Failures raised while turning source text into a [`djs_ast::SourceUnit`].
#[derive(Debug, Error)]
pub enum ParseError {
    /// `oxc` rejected the source as invalid JavaScript.
    #[error("syntax error: {message}")]
    Syntax {
        /// The underlying parser diagnostic.
        message: String,
    },
    /// The source is valid JavaScript but uses a construct outside this
    /// system's ES5 subset (classes, generators, `async`, template
    /// literals, regex literals, spread/rest, destructuring, `for-in`/
    /// `for-of`, `switch`, labelled statements, `with`, optional
    /// chaining, computed object-literal keys, array elisions, `let`/
    /// `const`).
    #[error("unsupported construct: {what}")]
    UnsupportedConstruct {
        /// A human-readable name for the rejected construct.
        what: String,
        /// Where it occurred.
        span: Span,
    },
}

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

impl ParseError {
    /// Render a one-line snippet of `source` pointing at this error's
    /// span, for the CLI's error report (§7).
    pub fn snippet(&self, filename: &str, source: &str) -> String {
        let span = match self {
            ParseError::Syntax { .. } => Span::synthetic(),
            ParseError::UnsupportedConstruct { span, .. } => *span,
        };
        let start = span.start as usize;
        let line = source[..start.min(source.len())].lines().count().max(1);
        format!("{filename}:{line}: {self}")
    }
}
