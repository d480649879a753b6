use super::{Emission, Lifecycle, Phase};
use crate::offset::NormalizedOffset;

/// Device tilt → offset. Smoothing happens downstream, not here.
#[derive(Debug)]
pub struct OrientationEstimator {
    lifecycle: Lifecycle,
    neutral_beta: f32,
    max_tilt: f32,
    sensitivity: f32,
}

impl OrientationEstimator {
    pub fn new(neutral_beta: f32, max_tilt: f32, sensitivity: f32) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            neutral_beta,
            max_tilt,
            sensitivity,
        }
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn begin_start(&mut self) {
        self.lifecycle.begin();
    }

    pub fn resolve_start(&mut self, ok: bool) -> bool {
        self.lifecycle.resolve(ok)
    }

    pub fn stop(&mut self) -> bool {
        self.lifecycle.stop()
    }

    /// Pure mapping of one reading; `None` when either angle is missing or
    /// not a finite number.
    pub fn map(&self, beta: Option<f64>, gamma: Option<f64>) -> Emission {
        let (beta, gamma) = match (beta, gamma) {
            (Some(b), Some(g)) if b.is_finite() && g.is_finite() => (b as f32, g as f32),
            _ => return None,
        };
        let beta_offset = (beta - self.neutral_beta).clamp(-self.max_tilt, self.max_tilt);
        let gamma = gamma.clamp(-self.max_tilt, self.max_tilt);
        Some(NormalizedOffset::new(
            gamma / self.max_tilt * self.sensitivity,
            beta_offset / self.max_tilt * self.sensitivity,
            0.0,
        ))
    }

    pub fn process(&mut self, beta: Option<f64>, gamma: Option<f64>) -> Emission {
        if !self.lifecycle.is_running() {
            return None;
        }
        self.map(beta, gamma)
    }
}
