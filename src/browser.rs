use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use std::future::Future;
use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[rustfmt::skip]
use web_sys::{
    CanvasRenderingContext2d,
    Document,
    EventTarget,
    HtmlCanvasElement,
    HtmlImageElement,
    Response,
    Window,
};

// web-sys imports panic outside of wasm, so native test builds print instead
macro_rules! log {
    ($($t:tt)*) => {
        $crate::browser::console_log(&format!($($t)*))
    }
}

macro_rules! error {
    ($($t:tt)*) => {
        $crate::browser::console_error(&format!($($t)*))
    }
}

// ==================== Constants ====================
// Constants related to HTML elements
mod html {
    pub const CANVAS_ID: &str = "canvas";
    pub const CONTEXT_2D: &str = "2d";
}

pub type LoopClosure = Closure<dyn FnMut(f64)>;

#[cfg(target_arch = "wasm32")]
pub fn console_log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
pub fn console_log(message: &str) {
    eprintln!("{}", message);
}

#[cfg(target_arch = "wasm32")]
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
pub fn console_error(message: &str) {
    eprintln!("ERROR {}", message);
}

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

pub fn canvas() -> Result<HtmlCanvasElement> {
    document()?
        .get_element_by_id(html::CANVAS_ID)
        .ok_or_else(|| anyhow!("No Canvas Element found with ID : '{:#?}'", html::CANVAS_ID))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))
}

pub fn context() -> Result<CanvasRenderingContext2d> {
    canvas()?
        .get_context(html::CONTEXT_2D)
        // Result<Option<Object>, JsValue>
        // - JsValue error mapped to anyhow
        // - None mapped to an error as well
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

pub fn create_html_image_element() -> Result<HtmlImageElement> {
    HtmlImageElement::new()
        .map_err(|err| anyhow!("Could not create image element : {:#?}", err))
}

/// Inner size of the browser window in css pixels
pub fn window_size() -> Result<(u32, u32)> {
    let window = window()?;
    let width = window
        .inner_width()
        .map_err(|err| anyhow!("Could not read window width : {:#?}", err))?
        .as_f64()
        .ok_or_else(|| anyhow!("Window width is not a number"))?;
    let height = window
        .inner_height()
        .map_err(|err| anyhow!("Could not read window height : {:#?}", err))?
        .as_f64()
        .ok_or_else(|| anyhow!("Window height is not a number"))?;
    Ok((width as u32, height as u32))
}

/// Stretch the canvas backing store over the whole window
pub fn fit_canvas_to_window() -> Result<(u32, u32)> {
    let (width, height) = window_size()?;
    let canvas = canvas()?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok((width, height))
}

pub fn now() -> Result<f64> {
    Ok(window()?
        .performance()
        .ok_or_else(|| anyhow!("Performance object not found"))?
        .now())
}

pub fn closure_wrap<T: WasmClosure + ?Sized>(data: Box<T>) -> Closure<T> {
    Closure::wrap(data)
}

pub fn create_raf_closure(f: impl FnMut(f64) + 'static) -> LoopClosure {
    closure_wrap(Box::new(f))
}

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame : {:#?}", err))
}

/// Attach a long lived listener, the closure is leaked on purpose since
/// listeners stay registered for the lifetime of the page
pub fn add_event_listener<T>(target: &EventTarget, event: &str, closure: Closure<T>) -> Result<()>
where
    T: WasmClosure + ?Sized,
{
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not add '{}' listener : {:#?}", event, err))?;
    closure.forget();
    Ok(())
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

pub async fn fetch_json<T>(json_path: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let resp_value = fetch_with_str(json_path).await?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|element| anyhow!("error converting [{:#?}] to Response", element))?;
    if !resp.ok() {
        return Err(anyhow!(
            "fetching [{}] returned status {}",
            json_path,
            resp.status()
        ));
    }
    let json = resp
        .json()
        .map_err(|err| anyhow!("Could not get JSON from response [{:#?}]", err))?;

    let json_value = JsFuture::from(json)
        .await
        .map_err(|err| anyhow!("error fetching [{:#?}]", err))?;

    serde_wasm_bindgen::from_value(json_value)
        .map_err(|err| anyhow!("error converting response : {:#?}", err))
}

async fn fetch_with_str(resource: &str) -> Result<JsValue> {
    let resp = window()?.fetch_with_str(resource);

    JsFuture::from(resp)
        .await
        .map_err(|err| anyhow!("error fetching : {:#?}", err))
}
