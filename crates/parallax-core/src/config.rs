use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackingError};
use crate::estimator::Source;

/// Interim source used while a gated source is pending or after it failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackSource {
    Pointer,
    Ambient,
}

impl From<FallbackSource> for Source {
    fn from(f: FallbackSource) -> Self {
        match f {
            FallbackSource::Pointer => Source::Pointer,
            FallbackSource::Ambient => Source::Ambient,
        }
    }
}

/// Construction-time options. Every field has a default so the embedding
/// page can override any subset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub sensitivity: f32,
    pub smoothing: f32,
    pub face_smoothing: f32,
    pub face_decay: f32,
    pub max_tilt_deg: f32,
    pub neutral_beta_deg: f32,
    pub fallback_radius: f32,
    pub fallback_speed: f32,
    pub reduced_motion_scale: f32,
    pub detection_fps: f32,
    pub settle_delay_ms: u32,
    pub video_timeout_ms: u32,
    /// Wait for the first usable orientation reading before giving up.
    pub sensor_timeout_ms: u32,
    pub handheld_fallback: FallbackSource,
    pub desktop_fallback: FallbackSource,
    pub enable_face: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            smoothing: 0.08,
            face_smoothing: 0.15,
            face_decay: 0.92,
            max_tilt_deg: 30.0,
            neutral_beta_deg: 45.0,
            fallback_radius: 0.35,
            fallback_speed: 0.25,
            reduced_motion_scale: 0.4,
            detection_fps: 15.0,
            settle_delay_ms: 1200,
            video_timeout_ms: 5000,
            sensor_timeout_ms: 3000,
            handheld_fallback: FallbackSource::Ambient,
            desktop_fallback: FallbackSource::Pointer,
            enable_face: true,
        }
    }
}

impl TrackingConfig {
    pub fn validate(&self) -> Result<()> {
        fn open_unit(name: &str, v: f32) -> Result<()> {
            if v > 0.0 && v < 1.0 {
                Ok(())
            } else {
                Err(TrackingError::Config(format!("{name} must be in (0, 1), got {v}")))
            }
        }
        fn positive(name: &str, v: f32) -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(TrackingError::Config(format!("{name} must be positive, got {v}")))
            }
        }

        open_unit("smoothing", self.smoothing)?;
        open_unit("face_smoothing", self.face_smoothing)?;
        open_unit("face_decay", self.face_decay)?;
        positive("sensitivity", self.sensitivity)?;
        positive("max_tilt_deg", self.max_tilt_deg)?;
        positive("fallback_speed", self.fallback_speed)?;
        positive("detection_fps", self.detection_fps)?;
        if !(0.0..=1.0).contains(&self.fallback_radius) {
            return Err(TrackingError::Config(format!(
                "fallback_radius must be in [0, 1], got {}",
                self.fallback_radius
            )));
        }
        if !(self.reduced_motion_scale > 0.0 && self.reduced_motion_scale <= 1.0) {
            return Err(TrackingError::Config(format!(
                "reduced_motion_scale must be in (0, 1], got {}",
                self.reduced_motion_scale
            )));
        }
        if self.video_timeout_ms == 0 {
            return Err(TrackingError::Config("video_timeout_ms must be non-zero".into()));
        }
        if self.sensor_timeout_ms == 0 {
            return Err(TrackingError::Config("sensor_timeout_ms must be non-zero".into()));
        }
        Ok(())
    }

    /// Milliseconds between face detection ticks.
    #[inline]
    pub fn detection_interval_ms(&self) -> u32 {
        (1000.0 / self.detection_fps).round().max(1.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(TrackingConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_smoothing_outside_open_interval() {
        let cfg = TrackingConfig {
            smoothing: 1.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(TrackingError::Config(_))));
    }

    #[test]
    fn rejects_zero_timeouts() {
        for cfg in [
            TrackingConfig {
                video_timeout_ms: 0,
                ..Default::default()
            },
            TrackingConfig {
                sensor_timeout_ms: 0,
                ..Default::default()
            },
        ] {
            assert!(matches!(cfg.validate(), Err(TrackingError::Config(_))));
        }
    }

    #[test]
    fn detection_interval_follows_fps() {
        let cfg = TrackingConfig {
            detection_fps: 20.0,
            ..Default::default()
        };
        assert_eq!(cfg.detection_interval_ms(), 50);
    }
}
