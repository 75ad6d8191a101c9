//! Browser tests, run with `wasm-pack test --headless --firefox`
#![cfg(target_arch = "wasm32")]

use flappy_fighter::browser;
use flappy_fighter::engine;
use flappy_fighter::settings::Settings;
use js_sys::{Object, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn ensure_canvas() {
    let document = browser::document().unwrap();
    if document.get_element_by_id("canvas").is_none() {
        let canvas = document.create_element("canvas").unwrap();
        canvas.set_id("canvas");
        document.body().unwrap().append_child(&canvas).unwrap();
    }
}

#[wasm_bindgen_test]
fn finds_the_canvas_context() {
    ensure_canvas();
    assert!(browser::context().is_ok());
}

#[wasm_bindgen_test]
fn canvas_follows_the_window() {
    ensure_canvas();
    let (width, height) = browser::fit_canvas_to_window().unwrap();
    let canvas = browser::canvas().unwrap();
    assert_eq!(canvas.width(), width);
    assert_eq!(canvas.height(), height);
}

#[wasm_bindgen_test]
fn clock_moves_forward() {
    let first = browser::now().unwrap();
    let second = browser::now().unwrap();
    assert!(second >= first);
}

#[wasm_bindgen_test]
async fn missing_image_fails_to_load() {
    let result = engine::load_image("does-not-exist.png").await;
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn settings_decode_from_a_js_object() {
    let bird = Object::new();
    Reflect::set(&bird, &"flap_impulse".into(), &JsValue::from_f64(-6.0)).unwrap();
    let root = Object::new();
    Reflect::set(&root, &"bird".into(), &bird).unwrap();

    let settings: Settings = serde_wasm_bindgen::from_value(root.into()).unwrap();
    assert_eq!(settings.bird.flap_impulse, -6.0);
    assert_eq!(settings.bird.gravity, 0.4);
    assert!(settings.validate().is_ok());
}
