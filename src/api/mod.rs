//! InkML WASM API
//!
//! JavaScript-facing entry points of the reader.
//!
//! # Module Structure
//!
//! - `helpers`: Console logging, serialization and error conversion
//! - `reader`: Parsing functions (`parseInkML`, `parseInkMLJson`, `parseInkMLWithSettings`)

pub mod helpers;
pub mod reader;

pub use reader::{parse_inkml, parse_inkml_json, parse_inkml_with_settings};
