//! Data models for parsed InkML documents
//!
//! This module contains the definition entities (channels, trace formats,
//! contexts, ...) and the decoded ink model built from them.

pub mod definitions;
pub mod ink;
pub mod serde_helpers;

// Re-export commonly used types
pub use definitions::*;
pub use ink::*;
