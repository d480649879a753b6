//! Snapshot of what the current device and browser can do.
//!
//! The platform layer fills this in with pure queries; an API that is not
//! present is simply `false`.

use crate::constants::HANDHELD_MAX_WIDTH;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Capabilities {
    pub touch_capable: bool,
    pub has_orientation_sensor: bool,
    pub orientation_needs_permission: bool,
    pub has_camera_api: bool,
    pub prefers_reduced_motion: bool,
    /// Viewport size in CSS pixels.
    pub viewport: [f32; 2],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    Handheld,
    Desktop,
}

impl Capabilities {
    /// Touch-capable with a small screen is handheld; everything else,
    /// including large touch laptops, takes the desktop path.
    pub fn device_class(&self) -> DeviceClass {
        let short_side = self.viewport[0].min(self.viewport[1]);
        let small = self.viewport[0] <= HANDHELD_MAX_WIDTH || short_side <= HANDHELD_MAX_WIDTH * 0.6;
        if self.touch_capable && small {
            DeviceClass::Handheld
        } else {
            DeviceClass::Desktop
        }
    }
}
