//! Reader operations for the WASM API

use crate::api::helpers::{ink_error_to_js, serialize, settings_from_js};
use crate::models::Ink;
use crate::parse::{parse_with_settings, ReaderSettings};
use crate::{wasm_error, wasm_info};
use wasm_bindgen::prelude::*;

fn read(text: &str, settings: Option<ReaderSettings>) -> Result<Ink, JsValue> {
    wasm_info!("Parsing InkML document ({} bytes)", text.len());

    let ink = parse_with_settings(text, settings).map_err(|e| ink_error_to_js(&e))?;

    wasm_info!("  Decoded {} traces, {} groups", ink.traces.len(), ink.groups.len());
    Ok(ink)
}

/// Parse an InkML document into a plain JavaScript object
///
/// # Returns
/// The document model: `traces`, `groups`, `annotations`, `definitions`.
/// Failures throw an `InkMLError` whose `kind` names the error variant.
#[wasm_bindgen(js_name = parseInkML)]
pub fn parse_inkml(text: &str) -> Result<JsValue, JsValue> {
    let ink = read(text, None)?;
    serialize(&ink, "Failed to serialize ink")
}

/// Parse an InkML document with reader settings
///
/// `settings` is an object such as `{ applyResolution: false }`; missing
/// fields keep their defaults.
#[wasm_bindgen(js_name = parseInkMLWithSettings)]
pub fn parse_inkml_with_settings(text: &str, settings: JsValue) -> Result<JsValue, JsValue> {
    let settings = settings_from_js(settings)?;
    let ink = read(text, settings)?;
    serialize(&ink, "Failed to serialize ink")
}

/// Parse an InkML document and return the model as a JSON string
#[wasm_bindgen(js_name = parseInkMLJson)]
pub fn parse_inkml_json(text: &str) -> Result<String, JsValue> {
    let ink = read(text, None)?;
    ink.to_json().map_err(|e| {
        wasm_error!("JSON serialization error: {}", e);
        JsValue::from_str(&format!("JSON serialization error: {}", e))
    })
}
