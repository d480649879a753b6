//! Capability probe: pure, synchronous queries against the browser.
//!
//! Nothing here triggers a permission prompt or touches the camera. A
//! missing API is reported as `false`.

use js_sys::Reflect;
use parallax_core::Capabilities;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

use crate::dom;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

#[inline]
fn has_property(target: &JsValue, name: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

#[inline]
fn property(target: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

pub fn capabilities() -> Capabilities {
    let Some(window) = web::window() else {
        return Capabilities::default();
    };
    Capabilities {
        touch_capable: touch_capable(&window),
        has_orientation_sensor: has_property(&window, "DeviceOrientationEvent"),
        orientation_needs_permission: orientation_permission_fn(&window).is_some(),
        has_camera_api: has_camera_api(&window),
        prefers_reduced_motion: reduced_motion_query(&window)
            .map(|q| q.matches())
            .unwrap_or(false),
        viewport: dom::viewport_size(),
    }
}

fn touch_capable(window: &web::Window) -> bool {
    window.navigator().max_touch_points() > 0 || has_property(window, "ontouchstart")
}

fn has_camera_api(window: &web::Window) -> bool {
    property(&window.navigator(), "mediaDevices")
        .map(|md| has_property(&md, "getUserMedia"))
        .unwrap_or(false)
}

pub fn reduced_motion_query(window: &web::Window) -> Option<web::MediaQueryList> {
    window.match_media(REDUCED_MOTION_QUERY).ok().flatten()
}

/// `DeviceOrientationEvent.requestPermission`, present only on platforms
/// that gate the sensor behind a user gesture.
pub fn orientation_permission_fn(window: &web::Window) -> Option<js_sys::Function> {
    property(window, "DeviceOrientationEvent")
        .and_then(|ctor| property(&ctor, "requestPermission"))
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
}
