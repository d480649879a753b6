//! Frame smoothing helpers.
//!
//! `ema` is the per-reading filter used upstream by the face estimator;
//! [`FrameSmoother`] is the downstream, frame-rate independent accumulator.

use crate::constants::REFERENCE_FRAME_MS;
use crate::offset::NormalizedOffset;

/// Single exponential-moving-average step: `current + (target - current) * alpha`.
#[inline]
pub fn ema(current: f32, target: f32, alpha: f32) -> f32 {
    current + (target - current) * alpha
}

/// Interpolation factor for a frame of `dt_ms` given a smoothing factor `s`
/// expressed per reference (60 Hz) frame: `1 - (1 - s)^(dt / 16.67)`.
#[inline]
pub fn frame_factor(s: f32, dt_ms: f32) -> f32 {
    if dt_ms <= 0.0 {
        return 0.0;
    }
    1.0 - (1.0 - s.clamp(0.0, 1.0)).powf(dt_ms / REFERENCE_FRAME_MS)
}

/// Mutable accumulator easing toward the latest target. Readers receive
/// copies from [`FrameSmoother::value`] or [`FrameSmoother::step`].
#[derive(Clone, Copy, Debug)]
pub struct FrameSmoother {
    smoothing: f32,
    current: NormalizedOffset,
    target: NormalizedOffset,
}

impl FrameSmoother {
    pub fn new(smoothing: f32) -> Self {
        Self {
            smoothing,
            current: NormalizedOffset::ZERO,
            target: NormalizedOffset::ZERO,
        }
    }

    #[inline]
    pub fn set_target(&mut self, target: NormalizedOffset) {
        self.target = target;
    }

    #[inline]
    pub fn value(&self) -> NormalizedOffset {
        self.current
    }

    pub fn step(&mut self, dt_ms: f32) -> NormalizedOffset {
        let t = frame_factor(self.smoothing, dt_ms);
        self.current = self.current.lerp(self.target, t);
        self.current
    }

    /// Jump straight to the target without easing.
    pub fn snap(&mut self) {
        self.current = self.target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_frame_uses_raw_factor() {
        assert!((frame_factor(0.1, REFERENCE_FRAME_MS) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn zero_dt_does_not_move() {
        let mut s = FrameSmoother::new(0.2);
        s.set_target(NormalizedOffset::new(1.0, 1.0, 1.0));
        assert_eq!(s.step(0.0), NormalizedOffset::ZERO);
    }

    #[test]
    fn converges_toward_target() {
        let mut s = FrameSmoother::new(0.2);
        s.set_target(NormalizedOffset::new(1.0, -1.0, 0.5));
        let mut prev = 0.0;
        for _ in 0..200 {
            let v = s.step(16.67).x;
            assert!(v >= prev);
            prev = v;
        }
        assert!((s.value().x - 1.0).abs() < 1e-3);
        assert!((s.value().y + 1.0).abs() < 1e-3);
    }
}
