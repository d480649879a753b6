use glam::Vec3;

/// Viewer displacement from centre, each axis nominally in \[-1, 1\].
///
/// `x` is left/right, `y` is up/down and `z` is near/far (negative is
/// closer). Values are exchanged by copy so one consumer can never mutate
/// what another one sees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedOffset {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl NormalizedOffset {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.to_vec3().length()
    }

    #[inline]
    pub fn clamped(self, limit: f32) -> Self {
        Self {
            x: self.x.clamp(-limit, limit),
            y: self.y.clamp(-limit, limit),
            z: self.z.clamp(-limit, limit),
        }
    }

    #[inline]
    pub fn scaled(self, k: f32) -> Self {
        Self::from(self.to_vec3() * k)
    }

    #[inline]
    pub fn lerp(self, target: Self, t: f32) -> Self {
        Self::from(self.to_vec3().lerp(target.to_vec3(), t))
    }

    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl From<Vec3> for NormalizedOffset {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Linearly remap `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// No clamping is applied; callers clamp where the contract requires it.
#[inline]
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span.abs() < f32::EPSILON {
        return out_min;
    }
    out_min + (value - in_min) / span * (out_max - out_min)
}
