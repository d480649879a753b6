//! Tracking coordinator: picks the single authoritative motion source.
//!
//! The arbitrator is sans-IO. Platform events arrive as [`Message`]s through
//! [`Arbitrator::handle`], and everything that needs hardware, timers or a
//! user gesture leaves as an [`Effect`] for the driver to execute. Async
//! results come back tagged with the ticket of the request that caused
//! them, which is how late answers from a source that has since been
//! stopped are recognised and dropped.
//!
//! Selection rules, highest priority first:
//!
//! 1. reduced motion: ambient at reduced radius/speed, nothing else is ever
//!    attempted;
//! 2. handheld: orientation if present, behind a permission gesture when the
//!    platform requires it, with an interim source running meanwhile;
//! 3. desktop: the face estimator after a settle delay, pointer (or ambient)
//!    until then.
//!
//! A source that fails or is denied is not retried until [`Message::Restart`].

use crate::capability::{Capabilities, DeviceClass};
use crate::config::TrackingConfig;
use crate::estimator::{EstimatorSet, FaceDetection, Source, TrackerState};
use crate::offset::NormalizedOffset;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinatorState {
    Selecting,
    WaitingPermission,
    Tracking(Source),
    /// The preferred source failed; the fallback carries the session.
    Degraded(Source),
}

/// Continuation handed to the UI while a permission prompt is pending.
///
/// The UI resolves it from inside a user-gesture handler by dispatching
/// [`Message::PermissionResolved`]. If it is never resolved the interim
/// source simply keeps running.
#[derive(Debug, PartialEq, Eq)]
pub struct PermissionToken {
    ticket: u64,
}

impl PermissionToken {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

#[derive(Debug, PartialEq)]
pub enum Message {
    FaceDetection {
        session: u64,
        detection: Option<FaceDetection>,
    },
    Orientation {
        beta: Option<f64>,
        gamma: Option<f64>,
    },
    Pointer {
        x: f32,
        y: f32,
    },
    Resize {
        width: f32,
        height: f32,
    },
    Frame {
        dt_ms: f32,
    },
    SettleElapsed {
        ticket: u64,
    },
    StartResolved {
        source: Source,
        ticket: u64,
        ok: bool,
    },
    /// The user refused the hardware while it was starting (camera prompt
    /// dismissed). Recorded as a denial rather than a failure.
    StartDenied {
        source: Source,
        ticket: u64,
    },
    /// Hardware that was running went away (camera unplugged, track ended).
    SourceLost {
        source: Source,
        ticket: u64,
    },
    PermissionResolved {
        token: PermissionToken,
        granted: bool,
    },
    ReducedMotionChanged(bool),
    Recalibrate,
    Restart,
}

#[derive(Debug, PartialEq)]
pub enum Effect {
    ScheduleSettle { ticket: u64, delay_ms: u32 },
    StartFace { ticket: u64 },
    StopFace { ticket: u64 },
    StartOrientation { ticket: u64 },
    StopOrientation { ticket: u64 },
    PromptPermission(PermissionToken),
    DismissPrompt,
    ActiveSourceChanged(Source),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Settle { ticket: u64 },
    Permission { ticket: u64 },
    Starting { source: Source, ticket: u64 },
}

pub struct Arbitrator {
    config: TrackingConfig,
    caps: Capabilities,
    estimators: EstimatorSet,
    status: [TrackerState; 4],
    state: CoordinatorState,
    active: Option<Source>,
    interim: Source,
    pending: Option<Pending>,
    // Ticket of the hardware session currently owned by face / orientation.
    sessions: [Option<u64>; 2],
    next_ticket: u64,
    reduced_motion: bool,
    effects: Vec<Effect>,
}

impl Arbitrator {
    pub fn new(config: TrackingConfig, caps: Capabilities) -> Self {
        let mut estimators = EstimatorSet::new(&config);
        estimators
            .pointer
            .resize(caps.viewport[0], caps.viewport[1]);
        Self {
            estimators,
            status: [TrackerState::Uninitialized; 4],
            state: CoordinatorState::Selecting,
            active: None,
            interim: config.desktop_fallback.into(),
            pending: None,
            sessions: [None; 2],
            next_ticket: 1,
            reduced_motion: caps.prefers_reduced_motion,
            effects: Vec::new(),
            config,
            caps,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn active_source(&self) -> Option<Source> {
        self.active
    }

    pub fn tracker_state(&self, source: Source) -> TrackerState {
        self.status[source as usize]
    }

    pub fn estimators(&self) -> &EstimatorSet {
        &self.estimators
    }

    pub fn is_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn is_awaiting_permission(&self) -> bool {
        matches!(self.pending, Some(Pending::Permission { .. }))
    }

    /// Whether a start for `source` under `ticket` is still awaited. Hardware
    /// acquired for any other ticket should be released, not installed.
    pub fn wants_start(&self, source: Source, ticket: u64) -> bool {
        self.pending == Some(Pending::Starting { source, ticket })
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Run source selection. Only valid from [`CoordinatorState::Selecting`].
    pub fn setup(&mut self) {
        if self.state != CoordinatorState::Selecting {
            log::warn!("[arbitrator] setup called in state {:?}; ignoring", self.state);
            return;
        }
        if self.reduced_motion {
            self.enter_reduced_motion();
            return;
        }
        match self.caps.device_class() {
            DeviceClass::Handheld => self.setup_handheld(),
            DeviceClass::Desktop => self.setup_desktop(),
        }
    }

    fn setup_handheld(&mut self) {
        self.interim = self.config.handheld_fallback.into();
        if !self.caps.has_orientation_sensor {
            log::info!("[arbitrator] handheld without orientation sensor");
            self.set_status(Source::Orientation, TrackerState::Unavailable);
            self.switch_to(Source::Ambient);
            self.state = CoordinatorState::Tracking(Source::Ambient);
            return;
        }
        self.switch_to(self.interim);
        if self.caps.orientation_needs_permission {
            let ticket = self.ticket();
            self.pending = Some(Pending::Permission { ticket });
            self.set_status(Source::Orientation, TrackerState::AwaitingPermission);
            self.state = CoordinatorState::WaitingPermission;
            self.effects
                .push(Effect::PromptPermission(PermissionToken { ticket }));
            log::info!("[arbitrator] waiting for orientation permission (interim {:?})", self.interim);
        } else {
            self.state = CoordinatorState::Tracking(self.interim);
            self.attempt(Source::Orientation);
        }
    }

    fn setup_desktop(&mut self) {
        self.interim = self.config.desktop_fallback.into();
        if !self.caps.has_camera_api || !self.config.enable_face {
            log::info!("[arbitrator] desktop without camera path; pointer tracking");
            self.set_status(Source::Face, TrackerState::Unavailable);
            self.interim = Source::Pointer;
            self.switch_to(Source::Pointer);
            self.state = CoordinatorState::Tracking(Source::Pointer);
            return;
        }
        self.switch_to(self.interim);
        self.state = CoordinatorState::Tracking(self.interim);
        let ticket = self.ticket();
        self.pending = Some(Pending::Settle { ticket });
        self.effects.push(Effect::ScheduleSettle {
            ticket,
            delay_ms: self.config.settle_delay_ms,
        });
    }

    /// Single intake for every platform event. Returns the reading to
    /// forward to the broadcast layer, if any.
    pub fn handle(&mut self, msg: Message) -> Option<NormalizedOffset> {
        match msg {
            Message::FaceDetection { session, detection } => {
                if self.active == Some(Source::Face) && self.session(Source::Face) == Some(session) {
                    self.estimators.face.process(detection)
                } else {
                    log::trace!("[arbitrator] dropping stale face result (session {})", session);
                    None
                }
            }
            Message::Orientation { beta, gamma } => {
                if self.active == Some(Source::Orientation) {
                    self.estimators.orientation.process(beta, gamma)
                } else {
                    None
                }
            }
            Message::Pointer { x, y } => {
                if self.active == Some(Source::Pointer) {
                    self.estimators.pointer.process(x, y)
                } else {
                    None
                }
            }
            Message::Resize { width, height } => {
                self.estimators.pointer.resize(width, height);
                None
            }
            Message::Frame { dt_ms } => {
                if self.active == Some(Source::Ambient) {
                    self.estimators.ambient.advance(dt_ms)
                } else {
                    None
                }
            }
            Message::SettleElapsed { ticket } => {
                self.on_settle(ticket);
                None
            }
            Message::StartResolved { source, ticket, ok } => {
                self.on_start_resolved(source, ticket, ok);
                None
            }
            Message::StartDenied { source, ticket } => {
                if self.pending == Some(Pending::Starting { source, ticket }) {
                    self.pending = None;
                    self.fail_start(source, TrackerState::Denied);
                } else {
                    log::debug!("[arbitrator] stale denial for {} (ticket {})", source.name(), ticket);
                }
                None
            }
            Message::SourceLost { source, ticket } => {
                self.on_source_lost(source, ticket);
                None
            }
            Message::PermissionResolved { token, granted } => {
                self.on_permission(token, granted);
                None
            }
            Message::ReducedMotionChanged(on) => {
                if on && !self.reduced_motion {
                    log::info!("[arbitrator] reduced motion enabled; forcing ambient");
                    self.reduced_motion = true;
                    self.enter_reduced_motion();
                } else if !on && self.reduced_motion {
                    log::info!("[arbitrator] reduced motion disabled; staying on ambient for this session");
                }
                None
            }
            Message::Recalibrate => {
                self.estimators.face.recalibrate();
                log::info!("[arbitrator] face calibration cleared");
                None
            }
            Message::Restart => {
                self.restart();
                None
            }
        }
    }

    fn on_settle(&mut self, ticket: u64) {
        if self.pending != Some(Pending::Settle { ticket }) {
            log::debug!("[arbitrator] stale settle ticket {}", ticket);
            return;
        }
        self.pending = None;
        if self.tracker_state(Source::Face).is_terminal() {
            return;
        }
        self.attempt(Source::Face);
    }

    fn on_start_resolved(&mut self, source: Source, ticket: u64, ok: bool) {
        if self.pending != Some(Pending::Starting { source, ticket }) {
            log::debug!("[arbitrator] stale start result for {} (ticket {})", source.name(), ticket);
            if ok {
                // Hardware was acquired for a request nobody wants anymore.
                self.push_stop(source, ticket);
            }
            return;
        }
        self.pending = None;
        if ok {
            self.promote(source);
        } else {
            self.fail_start(source, TrackerState::Unavailable);
        }
    }

    fn fail_start(&mut self, source: Source, status: TrackerState) {
        log::warn!(
            "[arbitrator] {} did not start ({:?}); staying on {}",
            source.name(),
            status,
            self.interim.name()
        );
        self.estimators.resolve_start(source, false);
        self.set_session(source, None);
        self.set_status(source, status);
        self.state = CoordinatorState::Degraded(self.interim);
    }

    fn on_source_lost(&mut self, source: Source, ticket: u64) {
        if self.active != Some(source) || self.session(source) != Some(ticket) {
            return;
        }
        log::warn!("[arbitrator] lost {}; falling back to {}", source.name(), self.interim.name());
        self.switch_to(self.interim);
        self.set_status(source, TrackerState::Unavailable);
        self.state = CoordinatorState::Degraded(self.interim);
    }

    fn on_permission(&mut self, token: PermissionToken, granted: bool) {
        if self.pending != Some(Pending::Permission { ticket: token.ticket }) {
            log::debug!("[arbitrator] ignoring stale permission token {}", token.ticket);
            return;
        }
        self.pending = None;
        self.effects.push(Effect::DismissPrompt);
        if granted {
            log::info!("[arbitrator] orientation permission granted");
            self.state = CoordinatorState::Tracking(self.interim);
            self.attempt(Source::Orientation);
        } else {
            log::info!("[arbitrator] orientation permission denied; staying on {}", self.interim.name());
            self.set_status(Source::Orientation, TrackerState::Denied);
            self.state = CoordinatorState::Degraded(self.interim);
        }
    }

    fn enter_reduced_motion(&mut self) {
        self.cancel_pending();
        let scale = self.config.reduced_motion_scale;
        self.estimators
            .ambient
            .set_motion(self.config.fallback_radius * scale, self.config.fallback_speed * scale);
        self.interim = Source::Ambient;
        self.switch_to(Source::Ambient);
        self.state = CoordinatorState::Tracking(Source::Ambient);
    }

    fn restart(&mut self) {
        if self.reduced_motion {
            log::info!("[arbitrator] restart ignored under reduced motion");
            return;
        }
        log::info!("[arbitrator] restarting source selection");
        self.cancel_pending();
        if let Some(prev) = self.active.take() {
            self.stop_source(prev);
        }
        self.status = [TrackerState::Uninitialized; 4];
        self.estimators
            .ambient
            .set_motion(self.config.fallback_radius, self.config.fallback_speed);
        self.state = CoordinatorState::Selecting;
        self.setup();
    }

    /// Request hardware for a gated source while the interim keeps running.
    fn attempt(&mut self, source: Source) {
        let ticket = self.ticket();
        self.estimators.begin_start(source);
        self.set_status(source, TrackerState::Initializing);
        self.set_session(source, Some(ticket));
        self.pending = Some(Pending::Starting { source, ticket });
        match source {
            Source::Face => self.effects.push(Effect::StartFace { ticket }),
            Source::Orientation => self.effects.push(Effect::StartOrientation { ticket }),
            Source::Pointer | Source::Ambient => {}
        }
        log::info!("[arbitrator] attempting {} (ticket {})", source.name(), ticket);
    }

    /// A gated source came up: retire the interim first, then let it run.
    fn promote(&mut self, source: Source) {
        if let Some(prev) = self.active.take() {
            self.stop_source(prev);
        }
        self.estimators.resolve_start(source, true);
        self.set_status(source, TrackerState::Active);
        self.activate(source);
    }

    /// Switch to a source that needs no hardware (pointer / ambient).
    fn switch_to(&mut self, source: Source) {
        if self.active == Some(source) {
            return;
        }
        if let Some(prev) = self.active.take() {
            self.stop_source(prev);
        }
        self.estimators.begin_start(source);
        self.set_status(source, TrackerState::Active);
        self.activate(source);
    }

    fn activate(&mut self, source: Source) {
        self.active = Some(source);
        self.state = CoordinatorState::Tracking(source);
        self.effects.push(Effect::ActiveSourceChanged(source));
        log::info!("[arbitrator] active source: {}", source.name());
    }

    fn stop_source(&mut self, source: Source) {
        if self.estimators.stop(source) {
            if let Some(ticket) = self.session(source) {
                self.push_stop(source, ticket);
            }
            if !self.tracker_state(source).is_terminal() {
                self.set_status(source, TrackerState::Stopped);
            }
        }
        self.set_session(source, None);
    }

    fn cancel_pending(&mut self) {
        match self.pending.take() {
            Some(Pending::Permission { .. }) => {
                self.effects.push(Effect::DismissPrompt);
                self.set_status(Source::Orientation, TrackerState::Stopped);
            }
            Some(Pending::Starting { source, .. }) => self.stop_source(source),
            Some(Pending::Settle { .. }) | None => {}
        }
    }

    fn push_stop(&mut self, source: Source, ticket: u64) {
        match source {
            Source::Face => self.effects.push(Effect::StopFace { ticket }),
            Source::Orientation => self.effects.push(Effect::StopOrientation { ticket }),
            Source::Pointer | Source::Ambient => {}
        }
    }

    fn ticket(&mut self) -> u64 {
        let t = self.next_ticket;
        self.next_ticket += 1;
        t
    }

    fn set_status(&mut self, source: Source, status: TrackerState) {
        self.status[source as usize] = status;
    }

    fn session(&self, source: Source) -> Option<u64> {
        match source {
            Source::Face => self.sessions[0],
            Source::Orientation => self.sessions[1],
            Source::Pointer | Source::Ambient => None,
        }
    }

    fn set_session(&mut self, source: Source, ticket: Option<u64>) {
        match source {
            Source::Face => self.sessions[0] = ticket,
            Source::Orientation => self.sessions[1] = ticket,
            Source::Pointer | Source::Ambient => {}
        }
    }
}
