use parallax_core::Message;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::driver::Driver;
use crate::input::{self, KeyAction};
use crate::overlay;

pub fn handle_global_keydown(ev: &web::KeyboardEvent, driver: &Driver) {
    if ev.repeat() || ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
        return;
    }
    let Some(action) = input::action_for_key(&ev.key()) else {
        return;
    };
    match action {
        KeyAction::Recalibrate => driver.dispatch(Message::Recalibrate),
        KeyAction::Restart => driver.dispatch(Message::Restart),
        KeyAction::ToggleHint => {
            if let Some(document) = web::window().and_then(|w| w.document()) {
                overlay::toggle_hint(&document);
            }
        }
    }
    ev.prevent_default();
}

pub fn wire_global_keydown(driver: &Driver) {
    let Some(window) = web::window() else {
        return;
    };
    let driver = driver.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        handle_global_keydown(&ev, &driver);
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    closure.forget();
}
