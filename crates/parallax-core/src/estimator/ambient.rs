use super::{Emission, Lifecycle, Phase};
use crate::constants::{
    AMBIENT_BREATH_AMPLITUDE, AMBIENT_BREATH_HZ, AMBIENT_FREQ_X, AMBIENT_FREQ_Y, AMBIENT_PHASE,
};
use crate::offset::NormalizedOffset;
use std::f32::consts::TAU;

/// Synthetic idle motion: a bounded Lissajous figure with a slow breathing
/// term on Y. Fully determined by elapsed time, so it never fails to start.
#[derive(Debug)]
pub struct AmbientEstimator {
    lifecycle: Lifecycle,
    radius: f32,
    speed: f32,
    elapsed_sec: f32,
}

impl AmbientEstimator {
    pub fn new(radius: f32, speed: f32) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            radius,
            speed,
            elapsed_sec: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn elapsed_sec(&self) -> f32 {
        self.elapsed_sec
    }

    /// Used by the reduced-motion override.
    pub fn set_motion(&mut self, radius: f32, speed: f32) {
        self.radius = radius;
        self.speed = speed;
    }

    pub fn start(&mut self) {
        self.elapsed_sec = 0.0;
        self.lifecycle.begin();
        self.lifecycle.resolve(true);
    }

    pub fn stop(&mut self) -> bool {
        self.lifecycle.stop()
    }

    pub fn sample(&self, elapsed_sec: f32) -> NormalizedOffset {
        let t = elapsed_sec * self.speed;
        let x = self.radius * (AMBIENT_FREQ_X * t + AMBIENT_PHASE).sin();
        let breath = AMBIENT_BREATH_AMPLITUDE * self.radius * (TAU * AMBIENT_BREATH_HZ * elapsed_sec).sin();
        let y = self.radius * (AMBIENT_FREQ_Y * t).sin() + breath;
        NormalizedOffset::new(x, y, 0.0)
    }

    /// Advance by one render frame.
    pub fn advance(&mut self, dt_ms: f32) -> Emission {
        if !self.lifecycle.is_running() {
            return None;
        }
        self.elapsed_sec += dt_ms.max(0.0) / 1000.0;
        Some(self.sample(self.elapsed_sec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_in_elapsed_time() {
        let a = AmbientEstimator::new(0.4, 0.3);
        let b = AmbientEstimator::new(0.4, 0.3);
        for i in 0..20 {
            let t = i as f32 * 0.7;
            assert_eq!(a.sample(t), b.sample(t));
        }
    }

    #[test]
    fn stays_within_radius_plus_breath() {
        let a = AmbientEstimator::new(0.5, 1.0);
        let bound = 0.5 * (1.0 + AMBIENT_BREATH_AMPLITUDE) + 1e-5;
        for i in 0..2000 {
            let o = a.sample(i as f32 * 0.05);
            assert!(o.x.abs() <= 0.5 + 1e-5);
            assert!(o.y.abs() <= bound);
            assert_eq!(o.z, 0.0);
        }
    }

    #[test]
    fn start_resets_elapsed_time() {
        let mut a = AmbientEstimator::new(0.4, 0.3);
        a.start();
        let first = a.advance(16.0).unwrap();
        for _ in 0..100 {
            a.advance(16.0);
        }
        assert!(a.elapsed_sec() > 1.0);
        a.stop();
        a.start();
        assert_eq!(a.elapsed_sec(), 0.0);
        assert_eq!(a.advance(16.0).unwrap(), first);
    }

    #[test]
    fn x_leads_with_phase_offset_at_zero() {
        let o = AmbientEstimator::new(1.0, 1.0).sample(0.0);
        assert!((o.x - AMBIENT_PHASE.sin()).abs() < 1e-6);
        assert!(o.y.abs() < 1e-6);
    }
}
