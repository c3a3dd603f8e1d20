//! Browser-side checks for the JS bindings
#![cfg(target_arch = "wasm32")]

use js_sys::Function;
use page_flow::WasmPaginator;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const CONFIG: &str = r#"{
    "headerRight": "Page {page}",
    "footerLeft": "Confidential",
    "headerMinHeight": 40,
    "footerMinHeight": 30,
    "debounceMs": 0
}"#;

fn blocks_of(height: u32) -> Function {
    Function::new_with_args("ids", &format!("return ids.map(() => {height});"))
}

fn fixed_band() -> Function {
    Function::new_with_args("kind, left, right, width", "return kind === 'header' ? 40 : 30;")
}

#[wasm_bindgen_test]
fn reflow_through_js_callbacks() {
    let mut paginator = WasmPaginator::new(CONFIG).unwrap();
    paginator.set_blocks(&[1.0, 2.0, 3.0, 4.0, 5.0]);

    assert_eq!(paginator.reflow(&blocks_of(300), &fixed_band()), "applied");
    assert_eq!(paginator.get_page_count(), 3);

    let overlay = paginator.get_overlay().unwrap();
    assert!(overlay.contains("\"Page 3\""));
}

#[wasm_bindgen_test]
fn null_measurement_skips_pass() {
    let mut paginator = WasmPaginator::new(CONFIG).unwrap();
    paginator.set_blocks(&[1.0, 2.0]);

    let not_ready = Function::new_no_args("return null;");
    assert_eq!(paginator.reflow(&not_ready, &fixed_band()), "skipped");
    assert_eq!(paginator.get_page_count(), 1);
}

#[wasm_bindgen_test]
fn async_pass_goes_stale_after_edit() {
    let mut paginator = WasmPaginator::new(CONFIG).unwrap();
    paginator.set_blocks(&[1.0, 2.0, 3.0]);
    paginator.begin_pass().unwrap();
    let generation = paginator.get_generation();

    paginator.update_header_content("Edited", "");
    let outcome = paginator
        .complete_pass(generation, &[300.0, 300.0, 300.0], &fixed_band())
        .unwrap();
    assert_eq!(outcome, "stale");
}

#[wasm_bindgen_test]
fn only_newest_started_pass_applies() {
    let mut paginator = WasmPaginator::new(CONFIG).unwrap();
    paginator.set_blocks(&[1.0, 2.0, 3.0]);

    paginator.begin_pass().unwrap();
    let older = paginator.get_generation();
    paginator.begin_pass().unwrap();
    let newer = paginator.get_generation();

    let heights = [300.0, 300.0, 300.0];
    assert_eq!(paginator.complete_pass(older, &heights, &fixed_band()).unwrap(), "stale");
    assert_eq!(paginator.complete_pass(newer, &heights, &fixed_band()).unwrap(), "applied");
    assert_eq!(paginator.get_page_count(), 2);

    // Already consumed
    assert_eq!(paginator.complete_pass(newer, &heights, &fixed_band()).unwrap(), "stale");
}

#[wasm_bindgen_test]
fn header_click_reaches_callback() {
    let mut paginator = WasmPaginator::new(CONFIG).unwrap();
    paginator.set_blocks(&[1.0]);
    paginator.reflow(&blocks_of(100), &fixed_band());

    let clicked = Function::new_with_args("side, text, page", "globalThis.lastClick = [side, text, page];");
    paginator.on_header_click(clicked);

    assert_eq!(paginator.route_click(500.0, 110.0).as_deref(), Some("header-right"));
    assert_eq!(paginator.route_click(500.0, 500.0), None);
}

#[wasm_bindgen_test]
fn print_mode_hides_overlay() {
    let mut paginator = WasmPaginator::new(CONFIG).unwrap();
    paginator.set_print_mode(true);
    assert_eq!(paginator.get_overlay().unwrap(), "null");
    assert_eq!(paginator.route_click(500.0, 110.0), None);
}

#[wasm_bindgen_test]
fn unknown_preset_is_rejected() {
    let mut paginator = WasmPaginator::new("").unwrap();
    assert!(paginator.set_preset("postcard").is_err());
    assert!(paginator.set_preset("A4").is_ok());
}
