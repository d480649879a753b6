use super::{Emission, Lifecycle, Phase};
use crate::constants::{FACE_RATIO_FAR, FACE_RATIO_NEAR};
use crate::error::{Result, TrackingError};
use crate::offset::{map_range, NormalizedOffset};
use crate::smoothing::ema;

/// One face bounding box in normalized video space (`0..1` on both axes).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceDetection {
    pub cx: f32,
    pub cy: f32,
    pub width: f32,
    pub height: f32,
}

impl FaceDetection {
    #[inline]
    pub fn size(&self) -> f32 {
        self.width * self.height
    }

    pub fn validate(&self) -> Result<()> {
        if ![self.cx, self.cy, self.width, self.height].iter().all(|v| v.is_finite()) {
            return Err(TrackingError::InvalidReading("non-finite face box"));
        }
        if !(self.size() > 0.0) {
            return Err(TrackingError::InvalidReading("empty face box"));
        }
        Ok(())
    }
}

/// Centroid → offset with the horizontal axis mirrored; `z` comes from the
/// apparent-size ratio against the calibration baseline.
#[inline]
pub fn raw_face_offset(det: &FaceDetection, baseline: f32) -> NormalizedOffset {
    let x = map_range(det.cx, 0.0, 1.0, 1.0, -1.0);
    let y = map_range(det.cy, 0.0, 1.0, 1.0, -1.0);
    let z = depth_from_ratio(det.size() / baseline);
    NormalizedOffset::new(x, y, z)
}

/// Larger apparent face means closer, which is negative `z`. Piecewise so
/// the calibrated distance (ratio 1) sits exactly at zero.
#[inline]
pub fn depth_from_ratio(ratio: f32) -> f32 {
    let z = if ratio <= 1.0 {
        map_range(ratio, FACE_RATIO_FAR, 1.0, 1.0, 0.0)
    } else {
        map_range(ratio, 1.0, FACE_RATIO_NEAR, 0.0, -1.0)
    };
    z.clamp(-1.0, 1.0)
}

#[derive(Debug)]
pub struct FaceEstimator {
    lifecycle: Lifecycle,
    smoothing: f32,
    decay: f32,
    baseline: Option<f32>,
    smoothed: NormalizedOffset,
}

impl FaceEstimator {
    pub fn new(smoothing: f32, decay: f32) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            smoothing,
            decay,
            baseline: None,
            smoothed: NormalizedOffset::ZERO,
        }
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn baseline(&self) -> Option<f32> {
        self.baseline
    }

    pub fn begin_start(&mut self) {
        self.reset();
        self.lifecycle.begin();
    }

    pub fn resolve_start(&mut self, ok: bool) -> bool {
        self.lifecycle.resolve(ok)
    }

    pub fn stop(&mut self) -> bool {
        let stopped = self.lifecycle.stop();
        if stopped {
            self.reset();
        }
        stopped
    }

    /// Next detection becomes the new depth reference.
    pub fn recalibrate(&mut self) {
        self.baseline = None;
    }

    /// Feed one detection tick. A missing detection decays the previous
    /// estimate instead of snapping it to zero.
    pub fn process(&mut self, detection: Option<FaceDetection>) -> Emission {
        if !self.lifecycle.is_running() {
            return None;
        }
        match detection {
            None => {
                self.smoothed = self.smoothed.scaled(self.decay);
            }
            Some(det) => {
                if let Err(e) = det.validate() {
                    log::trace!("[face] dropping {:?}: {}", det, e);
                    return None;
                }
                let baseline = *self.baseline.get_or_insert_with(|| {
                    log::info!("[face] calibration baseline {:.4}", det.size());
                    det.size()
                });
                let raw = raw_face_offset(&det, baseline);
                self.smoothed = NormalizedOffset::new(
                    ema(self.smoothed.x, raw.x, self.smoothing),
                    ema(self.smoothed.y, raw.y, self.smoothing),
                    ema(self.smoothed.z, raw.z, self.smoothing),
                );
            }
        }
        Some(self.smoothed)
    }

    fn reset(&mut self) {
        self.baseline = None;
        self.smoothed = NormalizedOffset::ZERO;
    }
}
