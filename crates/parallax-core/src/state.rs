//! Camera rig consumer shared with the web frontend.
//!
//! The rig avoids platform-specific APIs; the renderer reads its matrices
//! every frame while the broadcaster moves the eye.

use glam::{Mat4, Vec3};

use crate::broadcast::OffsetConsumer;
use crate::constants::{RIG_CAMERA_Z, RIG_TRAVEL_XY, RIG_TRAVEL_Z};
use crate::offset::NormalizedOffset;

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Moves the camera eye with the viewer so the scene reads as a window.
/// The look-at target stays fixed, which produces the parallax.
#[derive(Clone, Debug)]
pub struct CameraRig {
    pub camera: Camera,
    home: Vec3,
    travel: Vec3,
    offset: NormalizedOffset,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, RIG_CAMERA_Z), Vec3::new(RIG_TRAVEL_XY, RIG_TRAVEL_XY, RIG_TRAVEL_Z))
    }
}

impl CameraRig {
    pub fn new(home: Vec3, travel: Vec3) -> Self {
        Self {
            camera: Camera {
                eye: home,
                target: Vec3::ZERO,
                up: Vec3::Y,
                aspect: 16.0 / 9.0,
                fovy_radians: std::f32::consts::FRAC_PI_4,
                znear: 0.1,
                zfar: 100.0,
            },
            home,
            travel,
            offset: NormalizedOffset::ZERO,
        }
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.camera.aspect = width / height.max(1.0);
    }

    pub fn offset(&self) -> NormalizedOffset {
        self.offset
    }

    pub fn view_proj(&self) -> Mat4 {
        self.camera.projection_matrix() * self.camera.view_matrix()
    }
}

impl OffsetConsumer for CameraRig {
    fn set_target_offset(&mut self, offset: NormalizedOffset) {
        self.offset = offset;
        // Negative z is closer, so it pulls the eye toward the target.
        self.camera.eye = self.home + offset.to_vec3() * self.travel;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centred_offset_keeps_home_eye() {
        let mut rig = CameraRig::default();
        rig.set_target_offset(NormalizedOffset::ZERO);
        assert_eq!(rig.camera.eye, Vec3::new(0.0, 0.0, RIG_CAMERA_Z));
    }

    #[test]
    fn closer_viewer_moves_eye_toward_target() {
        let mut rig = CameraRig::default();
        rig.set_target_offset(NormalizedOffset::new(0.5, -1.0, -1.0));
        assert!((rig.camera.eye.x - 0.5 * RIG_TRAVEL_XY).abs() < 1e-6);
        assert!((rig.camera.eye.y + RIG_TRAVEL_XY).abs() < 1e-6);
        assert!(rig.camera.eye.z < RIG_CAMERA_Z);
        assert_eq!(rig.camera.target, Vec3::ZERO);
    }
}
