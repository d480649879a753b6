use parallax_core::Message;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::dom;
use crate::driver::Driver;

/// Pointer position in client pixels. Listens on the window so overlays
/// on top of the canvas do not swallow movement.
pub fn wire_pointer(driver: &Driver) {
    let Some(window) = web::window() else {
        return;
    };
    let driver = driver.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        driver.dispatch(Message::Pointer {
            x: ev.client_x() as f32,
            y: ev.client_y() as f32,
        });
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Keeps the pointer mapping in step with the viewport.
pub fn wire_viewport_resize(driver: &Driver) {
    let Some(window) = web::window() else {
        return;
    };
    let driver = driver.clone();
    let closure = Closure::wrap(Box::new(move || {
        let [width, height] = dom::viewport_size();
        driver.dispatch(Message::Resize { width, height });
    }) as Box<dyn FnMut()>);
    _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    closure.forget();
}
