//! Effect executor. Runs the arbitrator's effects against the browser and
//! feeds every outcome back in as a message; nothing here decides which
//! source is active.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use parallax_core::{Effect, Message, PermissionToken, Pipeline, Source, TrackingConfig, TrackingError};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

use crate::events::orientation::{self, OrientationListener};
use crate::face::{self, FaceSession, FaceTracker};
use crate::{dom, overlay};

#[derive(Clone)]
pub struct Driver {
    pipeline: Rc<RefCell<Pipeline>>,
    config: Rc<TrackingConfig>,
    document: web::Document,
    face: Rc<RefCell<FaceTracker>>,
    orientation: Rc<RefCell<Option<OrientationListener>>>,
    prompt: Rc<RefCell<Option<PermissionToken>>>,
}

impl Driver {
    pub fn new(pipeline: Rc<RefCell<Pipeline>>, config: TrackingConfig, document: web::Document) -> Self {
        Self {
            pipeline,
            config: Rc::new(config),
            document,
            face: Rc::new(RefCell::new(FaceTracker::default())),
            orientation: Rc::new(RefCell::new(None)),
            prompt: Rc::new(RefCell::new(None)),
        }
    }

    pub fn setup(&self) {
        self.pipeline.borrow_mut().setup();
        self.run_effects();
    }

    pub fn dispatch(&self, msg: Message) {
        self.pipeline.borrow_mut().dispatch(msg);
        self.run_effects();
    }

    pub fn frame(&self, dt_ms: f32) {
        self.pipeline.borrow_mut().frame(dt_ms);
        self.run_effects();
    }

    // Effects may dispatch again; the pipeline is never borrowed while one runs.
    fn run_effects(&self) {
        loop {
            let effects = self.pipeline.borrow_mut().take_effects();
            if effects.is_empty() {
                break;
            }
            for effect in effects {
                self.execute(effect);
            }
        }
    }

    fn execute(&self, effect: Effect) {
        match effect {
            Effect::ScheduleSettle { ticket, delay_ms } => {
                let d = self.clone();
                dom::set_timeout(delay_ms, move || d.dispatch(Message::SettleElapsed { ticket }));
            }
            Effect::StartFace { ticket } => self.start_face(ticket),
            Effect::StopFace { ticket } => self.face.borrow_mut().stop(ticket),
            Effect::StartOrientation { ticket } => self.start_orientation(ticket),
            Effect::StopOrientation { ticket } => self.stop_orientation(ticket),
            Effect::PromptPermission(token) => {
                log::info!("[driver] sensor access needs a tap (ticket {})", token.ticket());
                *self.prompt.borrow_mut() = Some(token);
                overlay::show_permission_prompt(&self.document);
            }
            Effect::DismissPrompt => {
                self.prompt.borrow_mut().take();
                overlay::hide_permission_prompt(&self.document);
            }
            Effect::ActiveSourceChanged(source) => {
                log::info!("[driver] active source: {}", source.name());
                overlay::set_status(&self.document, source);
            }
        }
    }

    fn start_face(&self, ticket: u64) {
        let d = self.clone();
        spawn_local(async move {
            let msg = match face::acquire(&d.config).await {
                Ok(feed) => {
                    let wanted = d.pipeline.borrow().arbitrator().wants_start(Source::Face, ticket);
                    if wanted {
                        let session = FaceSession::begin(feed, ticket, d.clone(), d.config.detection_interval_ms());
                        d.face.borrow_mut().install(session);
                    } else {
                        log::debug!("[face] camera for ticket {} arrived after cancellation", ticket);
                        feed.release();
                    }
                    Message::StartResolved {
                        source: Source::Face,
                        ticket,
                        ok: true,
                    }
                }
                Err(TrackingError::PermissionDenied(what)) => {
                    log::warn!("[face] {} permission denied", what);
                    Message::StartDenied {
                        source: Source::Face,
                        ticket,
                    }
                }
                Err(e) => {
                    log::warn!("[face] start failed: {}", e);
                    Message::StartResolved {
                        source: Source::Face,
                        ticket,
                        ok: false,
                    }
                }
            };
            d.dispatch(msg);
        });
    }

    /// Listens immediately; the start counts as successful on the first
    /// reading that carries both angles, and as failed if none arrives
    /// within `sensor_timeout_ms`.
    fn start_orientation(&self, ticket: u64) {
        let decided = Rc::new(Cell::new(false));
        let seen = decided.clone();
        let d = self.clone();
        let listener = OrientationListener::attach(ticket, move |beta, gamma| {
            if !seen.get() {
                if beta.is_none() || gamma.is_none() {
                    return;
                }
                seen.set(true);
                d.dispatch(Message::StartResolved {
                    source: Source::Orientation,
                    ticket,
                    ok: true,
                });
            }
            d.dispatch(Message::Orientation { beta, gamma });
        });

        match listener {
            Ok(listener) => {
                if let Some(old) = self.orientation.borrow_mut().replace(listener) {
                    old.detach();
                }
                let d = self.clone();
                dom::set_timeout(self.config.sensor_timeout_ms, move || {
                    if decided.replace(true) {
                        return;
                    }
                    log::warn!("[orientation] no usable reading (ticket {})", ticket);
                    d.stop_orientation(ticket);
                    d.dispatch(Message::StartResolved {
                        source: Source::Orientation,
                        ticket,
                        ok: false,
                    });
                });
            }
            Err(e) => {
                log::warn!("[orientation] start failed: {}", e);
                self.dispatch(Message::StartResolved {
                    source: Source::Orientation,
                    ticket,
                    ok: false,
                });
            }
        }
    }

    fn stop_orientation(&self, ticket: u64) {
        let mut slot = self.orientation.borrow_mut();
        if slot.as_ref().map(|l| l.ticket()) == Some(ticket) {
            if let Some(listener) = slot.take() {
                listener.detach();
            }
        }
    }

    /// Permission button handler. The browser only honours the request from
    /// inside the click, so the platform call happens synchronously here.
    pub fn request_orientation_permission(&self) {
        let Some(token) = self.prompt.borrow_mut().take() else {
            log::debug!("[driver] permission click with nothing pending");
            return;
        };
        match orientation::request_permission() {
            None => self.dispatch(Message::PermissionResolved { token, granted: true }),
            Some(Err(e)) => {
                log::warn!("[orientation] requestPermission threw: {:?}", e);
                self.dispatch(Message::PermissionResolved { token, granted: false });
            }
            Some(Ok(promise)) => {
                let d = self.clone();
                spawn_local(async move {
                    let granted = match JsFuture::from(promise).await {
                        Ok(v) => v.as_string().as_deref() == Some("granted"),
                        Err(e) => {
                            log::warn!("[orientation] permission request rejected: {:?}", e);
                            false
                        }
                    };
                    d.dispatch(Message::PermissionResolved { token, granted });
                });
            }
        }
    }
}
