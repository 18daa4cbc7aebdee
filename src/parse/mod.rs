//! InkML reader
//!
//! Converts InkML text into the [`Ink`] model.
//!
//! # Architecture
//!
//! ```text
//! InkML String
//!   ↓ [tree: parse with roxmltree]
//! XmlElement tree
//!   ↓ [resolver: collect definitions, resolve references]
//! Per-trace channel schema
//!   ↓ [decoder: split samples, undo difference coding, scale]
//! Channel value sequences
//!   ↓ [assembly: traces, groups, annotations]
//! Ink
//! ```
//!
//! The first error aborts the whole document.

pub mod assembly;
pub mod decoder;
pub mod definitions;
pub mod errors;
pub mod resolver;
pub mod tokens;
pub mod tree;

pub use errors::{InkError, InkResult, TraceRef};

use crate::models::Ink;
use assembly::Assembler;
use decoder::DecodeOptions;
use resolver::Resolver;
use serde::{Deserialize, Serialize};

/// Namespace URI of InkML documents
pub const INKML_NAMESPACE_URI: &str = "http://www.w3.org/2003/InkML";

/// Reader configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReaderSettings {
    /// Treat references without a leading `#` as local ids
    pub assume_local_refs: bool,
    /// Divide channel values by their declared resolution
    pub apply_resolution: bool,
    /// Accept a `<!DOCTYPE>` declaration
    pub allow_dtd: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            assume_local_refs: true,
            apply_resolution: true,
            allow_dtd: true,
        }
    }
}

/// Parse an InkML document with default settings
pub fn parse(text: &str) -> InkResult<Ink> {
    parse_with_settings(text, None)
}

/// Parse an InkML document
pub fn parse_with_settings(text: &str, settings: Option<ReaderSettings>) -> InkResult<Ink> {
    let settings = settings.unwrap_or_default();

    let root = tree::build_tree(text, settings.allow_dtd)?;

    if root.name != "ink" {
        return Err(InkError::MalformedDocument {
            line: root.line,
            column: root.column,
            message: format!("unexpected root element <{}>, expected <ink>", root.name),
        });
    }
    if !root.is_in_namespace(INKML_NAMESPACE_URI) {
        log::warn!("Root element is not in the InkML namespace \"{}\"", INKML_NAMESPACE_URI);
    }

    let resolver = Resolver::collect(&root, settings.assume_local_refs);
    let options = DecodeOptions { apply_resolution: settings.apply_resolution };

    let ink = Assembler::new(&resolver, options).assemble(&root)?;
    log::debug!("Parsed InkML document with {} traces", ink.traces.len());

    Ok(ink)
}
