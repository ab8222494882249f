//! Browser smoke tests for the JavaScript facade.
//!
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use scoping_graph_wasm::ScopingGraphWasm;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const GRAPH: &str = r#"{
    "nodes": [
        {"id": "A", "group": 0, "effect": [["x", 1]]},
        {"id": "B", "group": 1, "precondition": [["x", 1]]},
        {"id": "C", "group": 2}
    ],
    "links": [{"source": "A", "target": "B"}]
}"#;

#[wasm_bindgen_test]
fn load_and_step() {
    let mut viewer = ScopingGraphWasm::new();
    assert!(viewer.load_json(GRAPH));
    assert!(viewer.step_forward());
    assert!(viewer.tick());
    assert_eq!(viewer.get_positions().length(), 6);
    assert!(viewer.status().unwrap().is_object());
}

#[wasm_bindgen_test]
fn click_on_empty_space_returns_null() {
    let mut viewer = ScopingGraphWasm::new();
    assert!(viewer.load_json(GRAPH));
    assert_eq!(viewer.click(-5000.0, -5000.0).unwrap(), JsValue::NULL);
}

#[wasm_bindgen_test]
fn partial_config_is_accepted() {
    let mut viewer = ScopingGraphWasm::new();
    let config = r#"{"width": 1200, "forces": {"chargeVisible": -300}}"#;
    let config = js_sys::JSON::parse(config).unwrap();
    viewer.set_config(config).unwrap();
    assert!(viewer.load_json(GRAPH));
}

#[wasm_bindgen_test]
fn missing_storage_entry_leaves_viewer_empty() {
    let mut viewer = ScopingGraphWasm::new();
    let config = r#"{"storageKey": "scoping_graph_wasm_test_missing"}"#;
    let config = js_sys::JSON::parse(config).unwrap();
    viewer.set_config(config).unwrap();
    assert!(!viewer.load_from_storage());
    assert_eq!(viewer.status_text(), "No data loaded");
}
