//! Source estimators: each turns one raw motion signal into a
//! [`NormalizedOffset`].
//!
//! Estimators never touch hardware themselves. Their lifecycle is driven by
//! the arbitrator (`begin_start` / `resolve_start` / `stop`) while the
//! platform driver performs the actual acquisition.

mod ambient;
mod face;
mod orientation;
mod pointer;

pub use ambient::AmbientEstimator;
pub use face::{depth_from_ratio, raw_face_offset, FaceDetection, FaceEstimator};
pub use orientation::OrientationEstimator;
pub use pointer::PointerEstimator;

use crate::config::TrackingConfig;
use crate::offset::NormalizedOffset;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    Face,
    Orientation,
    Pointer,
    Ambient,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::Face,
        Source::Orientation,
        Source::Pointer,
        Source::Ambient,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Source::Face => "face",
            Source::Orientation => "orientation",
            Source::Pointer => "pointer",
            Source::Ambient => "ambient",
        }
    }
}

/// Internal lifecycle shared by every estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Starting,
    Running,
    Stopped,
}

/// Per-estimator status the arbitrator selects on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackerState {
    #[default]
    Uninitialized,
    Initializing,
    AwaitingPermission,
    Active,
    Denied,
    Unavailable,
    Stopped,
}

impl TrackerState {
    /// Denied and unavailable sources are never attempted again within a
    /// session unless an explicit restart clears them.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, TrackerState::Denied | TrackerState::Unavailable)
    }
}

/// Lifecycle bookkeeping embedded in each estimator.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Lifecycle {
    phase: Phase,
}

impl Lifecycle {
    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub(crate) fn begin(&mut self) {
        self.phase = Phase::Starting;
    }

    /// Returns whether the estimator is now running.
    pub(crate) fn resolve(&mut self, ok: bool) -> bool {
        if self.phase != Phase::Starting {
            return false;
        }
        self.phase = if ok { Phase::Running } else { Phase::Stopped };
        ok
    }

    /// Returns `true` only for the call that actually stopped something.
    pub(crate) fn stop(&mut self) -> bool {
        match self.phase {
            Phase::Starting | Phase::Running => {
                self.phase = Phase::Stopped;
                true
            }
            Phase::Idle | Phase::Stopped => false,
        }
    }
}

/// The closed set of estimators, one of each kind, owned by the arbitrator.
#[derive(Debug)]
pub struct EstimatorSet {
    pub face: FaceEstimator,
    pub orientation: OrientationEstimator,
    pub pointer: PointerEstimator,
    pub ambient: AmbientEstimator,
}

impl EstimatorSet {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            face: FaceEstimator::new(config.face_smoothing, config.face_decay),
            orientation: OrientationEstimator::new(
                config.neutral_beta_deg,
                config.max_tilt_deg,
                config.sensitivity,
            ),
            pointer: PointerEstimator::default(),
            ambient: AmbientEstimator::new(config.fallback_radius, config.fallback_speed),
        }
    }

    pub fn phase(&self, source: Source) -> Phase {
        match source {
            Source::Face => self.face.phase(),
            Source::Orientation => self.orientation.phase(),
            Source::Pointer => self.pointer.phase(),
            Source::Ambient => self.ambient.phase(),
        }
    }

    #[inline]
    pub fn is_running(&self, source: Source) -> bool {
        self.phase(source) == Phase::Running
    }

    pub fn running_count(&self) -> usize {
        Source::ALL.iter().filter(|s| self.is_running(**s)).count()
    }

    /// Move `source` into its starting phase. Pointer and ambient need no
    /// hardware and are running as soon as this returns.
    pub fn begin_start(&mut self, source: Source) {
        match source {
            Source::Face => self.face.begin_start(),
            Source::Orientation => self.orientation.begin_start(),
            Source::Pointer => self.pointer.start(),
            Source::Ambient => self.ambient.start(),
        }
    }

    pub fn resolve_start(&mut self, source: Source, ok: bool) -> bool {
        match source {
            Source::Face => self.face.resolve_start(ok),
            Source::Orientation => self.orientation.resolve_start(ok),
            Source::Pointer | Source::Ambient => self.is_running(source),
        }
    }

    pub fn stop(&mut self, source: Source) -> bool {
        match source {
            Source::Face => self.face.stop(),
            Source::Orientation => self.orientation.stop(),
            Source::Pointer => self.pointer.stop(),
            Source::Ambient => self.ambient.stop(),
        }
    }
}

/// Fresh offset carried by an accepted reading.
pub type Emission = Option<NormalizedOffset>;
