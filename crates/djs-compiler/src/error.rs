//! Compile-time failures (§7, "Compile errors"). The public `compile`
//! entry point never returns a partially built `Program` — every error
//! path here aborts before `ProgramBuilder::build` is reached.

use djs_ast::Span;
use thiserror::Error;

/// Everything that can abort a `compile` call.
#[derive(Debug, Error)]
pub enum CompileError {
    /// An identifier resolved to nothing: not a local, not an enclosing
    /// closure capture, not a preloaded global.
    #[error("unresolved symbol `{name}`")]
    UnresolvedSymbol {
        /// The unbound name.
        name: String,
        /// Where it was referenced.
        span: Span,
    },
    /// A syntactically valid tree shape this compiler does not lower
    /// (destructuring targets, computed object keys past what the parser
    /// already rejects, etc.).
    #[error("unsupported construct: {what}")]
    UnsupportedConstruct {
        /// Human-readable description.
        what: String,
        /// Where it occurred.
        span: Span,
    },
    /// A preload entry or literal could not be turned into a well-formed
    /// constant (e.g. a `Foo::prototype` name that doesn't name one of
    /// the six base prototypes).
    #[error("malformed constant: {reason}")]
    MalformedConstant {
        /// What was wrong.
        reason: String,
    },
    /// The constant pool or chunk table overflowed its index width.
    #[error(transparent)]
    Bytecode(#[from] djs_bytecode::BytecodeError),
}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

impl CompileError {
    /// The span implicated by this error, if any (bytecode-layer
    /// overflow errors and malformed-constant errors have none).
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::UnresolvedSymbol { span, .. } => Some(*span),
            CompileError::UnsupportedConstruct { span, .. } => Some(*span),
            CompileError::MalformedConstant { .. } | CompileError::Bytecode(_) => None,
        }
    }

    /// Render a one-line, 1-indexed-line-number snippet for the CLI's
    /// error report, mirroring `djs_parser::ParseError::snippet`.
    pub fn snippet(&self, filename: &str, source: &str) -> String {
        match self.span() {
            Some(span) => {
                let start = span.start as usize;
                let line = source[..start.min(source.len())].lines().count().max(1);
                format!("{filename}:{line}: {self}")
            }
            None => format!("{filename}: {self}"),
        }
    }
}
