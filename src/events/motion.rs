use parallax_core::Message;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::driver::Driver;
use crate::probe;

/// Forwards live changes of `prefers-reduced-motion`.
pub fn wire_reduced_motion(driver: &Driver) {
    let Some(query) = web::window().and_then(|w| probe::reduced_motion_query(&w)) else {
        return;
    };
    let driver = driver.clone();
    let current = query.clone();
    let closure = Closure::wrap(Box::new(move || {
        driver.dispatch(Message::ReducedMotionChanged(current.matches()));
    }) as Box<dyn FnMut()>);
    if query
        .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
        .is_err()
    {
        log::warn!("[driver] cannot observe reduced-motion changes");
    }
    closure.forget();
}
