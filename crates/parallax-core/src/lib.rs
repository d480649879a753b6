//! Platform-free tracking pipeline for the parallax backdrop.
//!
//! Raw motion readings enter through [`Pipeline::dispatch`], the
//! [`Arbitrator`] decides whether they come from the active source, and the
//! [`Broadcaster`] fans the smoothed result out to every consumer. Hardware
//! access is never performed here: the arbitrator emits [`Effect`]s that a
//! platform driver executes and answers with further [`Message`]s.

pub mod arbitrator;
pub mod broadcast;
pub mod capability;
pub mod config;
pub mod constants;
pub mod error;
pub mod estimator;
pub mod offset;
pub mod pipeline;
pub mod smoothing;
pub mod state;

pub use arbitrator::{Arbitrator, CoordinatorState, Effect, Message, PermissionToken};
pub use broadcast::{Broadcaster, OffsetConsumer, Shaping, SubscriberId};
pub use capability::{Capabilities, DeviceClass};
pub use config::{FallbackSource, TrackingConfig};
pub use error::{Result, TrackingError};
pub use estimator::{FaceDetection, Phase, Source, TrackerState};
pub use offset::NormalizedOffset;
pub use pipeline::Pipeline;
pub use smoothing::FrameSmoother;
pub use state::CameraRig;
