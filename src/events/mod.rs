pub mod keyboard;
pub mod motion;
pub mod orientation;
pub mod pointer;

pub use keyboard::wire_global_keydown;
pub use motion::wire_reduced_motion;
pub use pointer::{wire_pointer, wire_viewport_resize};

use crate::constants::PERMISSION_BUTTON_ID;
use crate::dom;
use crate::driver::Driver;
use web_sys as web;

/// The sensor permission request has to start inside this click.
pub fn wire_permission_button(document: &web::Document, driver: &Driver) {
    let driver = driver.clone();
    dom::add_click_listener(document, PERMISSION_BUTTON_ID, move || {
        driver.request_orientation_permission();
    });
}
