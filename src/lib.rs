//! InkML reader
//!
//! Reads W3C InkML documents into a decoded in-memory model: every trace as
//! per-channel value sequences, with difference coding undone and channel
//! resolution applied. Usable as a Rust library and as a WASM module.

pub mod api;
pub mod models;
pub mod parse;

// Re-export commonly used types
pub use models::*;
pub use parse::{parse, parse_with_settings, InkError, InkResult, ReaderSettings, TraceRef};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if console_log::init_with_level(log::Level::Debug).is_err() {
        crate::wasm_error!("Logger was already initialized");
    }

    log::info!("InkML reader WASM module initialized");
}
