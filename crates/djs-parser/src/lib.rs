//! # djs parser
//!
//! Turns JavaScript source text into the [`djs_ast`] tree the compiler
//! walks. Parsing itself is delegated to `oxc`; this crate's only job is
//! lowering that general-purpose AST down to this system's ES5 subset,
//! rejecting anything outside it with [`ParseError::UnsupportedConstruct`].

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

mod error;
mod lower;

pub use error::{ParseError, Result};

use djs_ast::{SourceId, SourceUnit};
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Parse one source file into a [`SourceUnit`].
///
/// `filename` is used only for diagnostics; `source_id` tags the unit so
/// later error reports (§7) can be traced back to the host's source map.
pub fn parse_source(source: &str, source_id: SourceId, filename: &str) -> Result<SourceUnit> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(filename)
        .unwrap_or_default()
        .with_script(true);
    let parsed = Parser::new(&allocator, source, source_type).parse();

    if let Some(diagnostic) = parsed.errors.first() {
        return Err(ParseError::Syntax {
            message: diagnostic.to_string(),
        });
    }

    let body = lower::lower_program(&parsed.program)?;
    Ok(SourceUnit {
        filename: filename.to_string(),
        source_id,
        body,
    })
}
