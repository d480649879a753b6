use js_sys::Reflect;
use parallax_core::TrackingError;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

use crate::{dom, probe};

/// A `deviceorientation` subscription owned by one start ticket.
pub struct OrientationListener {
    ticket: u64,
    closure: Closure<dyn FnMut(web::DeviceOrientationEvent)>,
}

impl OrientationListener {
    pub fn attach(
        ticket: u64,
        mut on_reading: impl FnMut(Option<f64>, Option<f64>) + 'static,
    ) -> Result<Self, TrackingError> {
        let window = web::window().ok_or(TrackingError::HardwareUnavailable("window"))?;
        let closure = Closure::wrap(Box::new(move |ev: web::DeviceOrientationEvent| {
            on_reading(ev.beta(), ev.gamma());
        }) as Box<dyn FnMut(web::DeviceOrientationEvent)>);
        window
            .add_event_listener_with_callback("deviceorientation", closure.as_ref().unchecked_ref())
            .map_err(|_| TrackingError::HardwareUnavailable("deviceorientation"))?;
        log::info!("[orientation] listening (ticket {})", ticket);
        Ok(Self { ticket, closure })
    }

    #[inline]
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn detach(self) {
        if let Some(window) = web::window() {
            _ = window.remove_event_listener_with_callback(
                "deviceorientation",
                self.closure.as_ref().unchecked_ref(),
            );
        }
        log::info!("[orientation] detached (ticket {})", self.ticket);
        dom::release_later(self.closure);
    }
}

/// Calls `DeviceOrientationEvent.requestPermission()`. Must run synchronously
/// inside a user gesture handler. `None` when the platform has no such gate.
pub fn request_permission() -> Option<Result<js_sys::Promise, JsValue>> {
    let window = web::window()?;
    let request = probe::orientation_permission_fn(&window)?;
    let ctor = Reflect::get(&window, &JsValue::from_str("DeviceOrientationEvent")).ok()?;
    Some(
        request
            .call0(&ctor)
            .and_then(|ret| ret.dyn_into::<js_sys::Promise>()),
    )
}
