//! Shared helpers for the WASM API
//!
//! Console logging, conversion between Rust and JavaScript values, and the
//! mapping of reader errors to JavaScript `Error` objects.

use crate::parse::{InkError, ReaderSettings};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ============================================================================
// Console Logging Functions
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn info(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn error(s: &str);
}

/// Log an info message with [WASM] prefix
#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

/// Log an error message with [WASM] ❌ prefix
#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

pub fn log_info(msg: &str) {
    info(&format!("[WASM] {}", msg));
}

pub fn log_error(msg: &str) {
    error(&format!("[WASM] ❌ {}", msg));
}

// ============================================================================
// Serialization/Deserialization Helpers
// ============================================================================

/// Deserialize a value from JavaScript with automatic error handling
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

/// Serialize a value to a plain JavaScript object
///
/// Maps become objects rather than `Map`s so channel data reads as
/// `trace.channels.X`.
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| {
            let msg = format!("{}: {}", error_context, e);
            log_error(&msg);
            JsValue::from_str(&msg)
        })
}

/// Reader settings passed from JavaScript; `undefined` or `null` means defaults
pub fn settings_from_js(value: JsValue) -> Result<Option<ReaderSettings>, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    deserialize(value, "Invalid reader settings").map(Some)
}

// ============================================================================
// Error Conversion
// ============================================================================

/// Short name of an error variant, exposed to JavaScript as `error.kind`
pub fn error_kind(err: &InkError) -> &'static str {
    match err {
        InkError::MalformedDocument { .. } => "MalformedDocument",
        InkError::UnresolvedTraceFormat { .. } => "UnresolvedTraceFormat",
        InkError::MalformedSample { .. } => "MalformedSample",
        InkError::InvalidChannelValue { .. } => "InvalidChannelValue",
    }
}

/// Convert a reader error into a JavaScript `Error` carrying `kind`
/// (and `line`/`column` for malformed documents)
pub fn ink_error_to_js(err: &InkError) -> JsValue {
    log_error(&err.to_string());

    let js_error = js_sys::Error::new(&err.to_string());
    js_error.set_name("InkMLError");

    let set = |key: &str, value: JsValue| {
        // Reflect::set only fails on frozen objects
        let _ = js_sys::Reflect::set(&js_error, &JsValue::from_str(key), &value);
    };

    set("kind", JsValue::from_str(error_kind(err)));
    if let InkError::MalformedDocument { line, column, .. } = err {
        set("line", JsValue::from(*line));
        set("column", JsValue::from(*column));
    }

    js_error.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::TraceRef;

    #[test]
    fn test_error_kind() {
        let err = InkError::MalformedSample {
            trace: TraceRef::Position(0),
            sample: 1,
            reason: "expected 2 values, found 3".to_string(),
        };
        assert_eq!(error_kind(&err), "MalformedSample");

        let err = InkError::MalformedDocument { line: 1, column: 1, message: String::new() };
        assert_eq!(error_kind(&err), "MalformedDocument");
    }
}
