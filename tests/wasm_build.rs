//! WASM build test
//!
//! Tests the JavaScript-facing reader functions. Runs under
//! `wasm-pack test` only.

#![cfg(target_arch = "wasm32")]

use inkml_wasm::api::{parse_inkml, parse_inkml_json, parse_inkml_with_settings};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const DOCUMENT: &str = r##"<ink xmlns="http://www.w3.org/2003/InkML">
  <definitions>
    <traceFormat xml:id="tf"><channel name="X" resolution="2"/><channel name="Y"/></traceFormat>
  </definitions>
  <trace xml:id="t1" traceFormatRef="#tf">10 0, 12 14</trace>
</ink>"##;

fn get(value: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn test_parse_inkml_returns_plain_object() {
    let ink = parse_inkml(DOCUMENT).unwrap();
    let traces = js_sys::Array::from(&get(&ink, "traces"));
    assert_eq!(traces.length(), 1);

    let x = js_sys::Array::from(&get(&get(&traces.get(0), "channels"), "X"));
    assert_eq!(x.get(0).as_f64(), Some(5.0));
    assert_eq!(x.get(1).as_f64(), Some(6.0));
}

#[wasm_bindgen_test]
fn test_parse_inkml_with_settings() {
    let settings = js_sys::Object::new();
    js_sys::Reflect::set(&settings, &JsValue::from_str("applyResolution"), &JsValue::FALSE).unwrap();

    let ink = parse_inkml_with_settings(DOCUMENT, settings.into()).unwrap();
    let traces = js_sys::Array::from(&get(&ink, "traces"));
    let x = js_sys::Array::from(&get(&get(&traces.get(0), "channels"), "X"));
    assert_eq!(x.get(0).as_f64(), Some(10.0));

    assert!(parse_inkml_with_settings(DOCUMENT, JsValue::UNDEFINED).is_ok());
}

#[wasm_bindgen_test]
fn test_parse_inkml_json() {
    let json = parse_inkml_json(DOCUMENT).unwrap();
    assert!(json.contains(r#""X":[5.0,6.0]"#));
}

#[wasm_bindgen_test]
fn test_errors_are_js_errors() {
    let err = parse_inkml("<ink><trace>1 2 3</trace></ink>").unwrap_err();
    assert!(err.is_instance_of::<js_sys::Error>());
    assert_eq!(get(&err, "kind").as_string().as_deref(), Some("MalformedSample"));

    let err = parse_inkml("<ink>").unwrap_err();
    assert_eq!(get(&err, "kind").as_string().as_deref(), Some("MalformedDocument"));
    assert!(get(&err, "line").as_f64().is_some());
}
