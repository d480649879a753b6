//! Camera capture and the face detection loop.
//!
//! Detection is delegated to an object the page installs at
//! `window.parallaxFaceDetector` with two methods: `load()` (optional,
//! may return a promise) and `detect(video)`, which returns (or resolves
//! to) `{ x, y, width, height }` in video pixels, or `null` when no face is
//! visible.

use std::cell::Cell;
use std::rc::Rc;

use js_sys::{Promise, Reflect};
use parallax_core::{FaceDetection, Message, Source, TrackingConfig, TrackingError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

use crate::constants::{CAPTURE_HEIGHT, CAPTURE_WIDTH, FACE_DETECTOR_GLOBAL};
use crate::driver::Driver;
use crate::{dom, input};

/// A granted camera stream playing into an off-screen video element.
pub struct CameraFeed {
    stream: web::MediaStream,
    video: web::HtmlVideoElement,
    detector: JsValue,
}

impl CameraFeed {
    /// Release hardware nobody asked for anymore.
    pub fn release(self) {
        stop_tracks(&self.stream);
        self.video.set_src_object(None);
    }
}

/// Acquire detector, camera and a playing video, in that order. Anything
/// acquired before a failure is released again.
/// Every wait is bounded by `video_timeout_ms`.
pub async fn acquire(config: &TrackingConfig) -> Result<CameraFeed, TrackingError> {
    let window = web::window().ok_or(TrackingError::HardwareUnavailable("window"))?;
    let timeout_ms = config.video_timeout_ms;
    let detector = load_detector(&window, timeout_ms).await?;
    let stream = open_stream(&window, timeout_ms).await?;
    match play_video(&window, &stream, timeout_ms).await {
        Ok(video) => Ok(CameraFeed {
            stream,
            video,
            detector,
        }),
        Err(e) => {
            stop_tracks(&stream);
            Err(e)
        }
    }
}

fn method(target: &JsValue, name: &str) -> Option<js_sys::Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
}

/// Await `value` if it is a promise, otherwise pass it through.
async fn settle(value: JsValue) -> Result<JsValue, JsValue> {
    match value.dyn_into::<Promise>() {
        Ok(p) => JsFuture::from(p).await,
        Err(v) => Ok(v),
    }
}

/// Race `promise` against a timer. `Ok(None)` means the timer won; the
/// promise keeps running and its late result is the caller's to clean up.
async fn within(window: &web::Window, promise: &Promise, ms: u32) -> Result<Option<JsValue>, JsValue> {
    let marker: JsValue = js_sys::Object::new().into();
    let window = window.clone();
    let timer = Promise::new(&mut |resolve, _reject| {
        _ = window.set_timeout_with_callback_and_timeout_and_arguments_1(
            &resolve,
            ms.min(i32::MAX as u32) as i32,
            &marker,
        );
    });
    let v = JsFuture::from(Promise::race(&js_sys::Array::of2(promise, &timer))).await?;
    Ok(if js_sys::Object::is(&v, &marker) { None } else { Some(v) })
}

async fn load_detector(window: &web::Window, timeout_ms: u32) -> Result<JsValue, TrackingError> {
    let detector = Reflect::get(window, &JsValue::from_str(FACE_DETECTOR_GLOBAL))
        .ok()
        .filter(|v| v.is_object())
        .ok_or_else(|| {
            TrackingError::LibraryLoadFailure(format!("window.{FACE_DETECTOR_GLOBAL} is not set"))
        })?;
    if method(&detector, "detect").is_none() {
        return Err(TrackingError::LibraryLoadFailure(format!(
            "window.{FACE_DETECTOR_GLOBAL}.detect is not a function"
        )));
    }
    if let Some(load) = method(&detector, "load") {
        let ret = load
            .call0(&detector)
            .map_err(|e| TrackingError::LibraryLoadFailure(format!("{:?}", e)))?;
        if let Ok(pending) = ret.dyn_into::<Promise>() {
            match within(window, &pending, timeout_ms).await {
                Ok(Some(_)) => {}
                Ok(None) => return Err(TrackingError::Timeout(timeout_ms)),
                Err(e) => return Err(TrackingError::LibraryLoadFailure(format!("{:?}", e))),
            }
        }
    }
    log::info!("[face] detector ready");
    Ok(detector)
}

fn camera_error(err: JsValue) -> TrackingError {
    let name = Reflect::get(&err, &JsValue::from_str("name"))
        .ok()
        .and_then(|n| n.as_string())
        .unwrap_or_default();
    match name.as_str() {
        "NotAllowedError" | "SecurityError" => TrackingError::PermissionDenied("camera"),
        _ => {
            log::debug!("[face] getUserMedia rejected: {:?}", err);
            TrackingError::HardwareUnavailable("camera")
        }
    }
}

async fn open_stream(window: &web::Window, timeout_ms: u32) -> Result<web::MediaStream, TrackingError> {
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|_| TrackingError::HardwareUnavailable("mediaDevices"))?;

    let video = js_sys::Object::new();
    _ = Reflect::set(&video, &"facingMode".into(), &"user".into());
    _ = Reflect::set(&video, &"width".into(), &JsValue::from(CAPTURE_WIDTH));
    _ = Reflect::set(&video, &"height".into(), &JsValue::from(CAPTURE_HEIGHT));
    let constraints = web::MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::FALSE);
    constraints.set_video(&video);

    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(camera_error)?;
    match within(window, &promise, timeout_ms).await.map_err(camera_error)? {
        Some(stream) => stream
            .dyn_into::<web::MediaStream>()
            .map_err(|_| TrackingError::HardwareUnavailable("camera")),
        None => {
            // An unanswered prompt may still grant later; release that stream.
            spawn_local(async move {
                if let Ok(late) = JsFuture::from(promise).await {
                    if let Ok(stream) = late.dyn_into::<web::MediaStream>() {
                        log::debug!("[face] releasing camera granted after timeout");
                        stop_tracks(&stream);
                    }
                }
            });
            Err(TrackingError::Timeout(timeout_ms))
        }
    }
}

async fn play_video(
    window: &web::Window,
    stream: &web::MediaStream,
    timeout_ms: u32,
) -> Result<web::HtmlVideoElement, TrackingError> {
    let document = window
        .document()
        .ok_or(TrackingError::HardwareUnavailable("document"))?;
    let video = document
        .create_element("video")
        .ok()
        .and_then(|el| el.dyn_into::<web::HtmlVideoElement>().ok())
        .ok_or(TrackingError::HardwareUnavailable("video element"))?;
    video.set_muted(true);
    video.set_autoplay(true);
    _ = video.set_attribute("playsinline", "");
    video.set_src_object(Some(stream));

    let play = video
        .play()
        .map_err(|_| TrackingError::HardwareUnavailable("video playback"))?;
    match within(window, &play, timeout_ms).await {
        Ok(None) => {
            video.set_src_object(None);
            Err(TrackingError::Timeout(timeout_ms))
        }
        Ok(Some(_)) => Ok(video),
        Err(e) => {
            log::debug!("[face] video.play() rejected: {:?}", e);
            video.set_src_object(None);
            Err(TrackingError::HardwareUnavailable("video playback"))
        }
    }
}

fn stop_tracks(stream: &web::MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<web::MediaStreamTrack>() {
            track.stop();
        }
    }
}

/// Parse one detector result into video-normalized space.
fn read_detection(value: &JsValue, video: &web::HtmlVideoElement) -> Option<FaceDetection> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    let num = |name: &str| {
        Reflect::get(value, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_f64())
            .map(|v| v as f32)
    };
    let [cx, cy, width, height] = input::normalize_box(
        num("x")?,
        num("y")?,
        num("width")?,
        num("height")?,
        video.video_width() as f32,
        video.video_height() as f32,
    )?;
    Some(FaceDetection {
        cx,
        cy,
        width,
        height,
    })
}

/// A running detection loop bound to one start ticket.
pub struct FaceSession {
    ticket: u64,
    feed: CameraFeed,
    interval: i32,
    tick: Closure<dyn FnMut()>,
    ended: Option<(web::MediaStreamTrack, Closure<dyn FnMut()>)>,
}

impl FaceSession {
    pub fn begin(feed: CameraFeed, ticket: u64, driver: Driver, interval_ms: u32) -> Self {
        let busy = Rc::new(Cell::new(false));
        let detector = feed.detector.clone();
        let video = feed.video.clone();
        let tick_driver = driver.clone();
        let tick = Closure::wrap(Box::new(move || {
            if busy.replace(true) {
                return;
            }
            let busy = busy.clone();
            let detector = detector.clone();
            let video = video.clone();
            let driver = tick_driver.clone();
            spawn_local(async move {
                let detection = match method(&detector, "detect") {
                    Some(detect) => match detect.call1(&detector, &video) {
                        Ok(ret) => match settle(ret).await {
                            Ok(v) => read_detection(&v, &video),
                            Err(e) => {
                                log::debug!("[face] detect rejected: {:?}", e);
                                None
                            }
                        },
                        Err(e) => {
                            log::debug!("[face] detect threw: {:?}", e);
                            None
                        }
                    },
                    None => None,
                };
                busy.set(false);
                driver.dispatch(Message::FaceDetection {
                    session: ticket,
                    detection,
                });
            });
        }) as Box<dyn FnMut()>);

        let interval = web::window()
            .and_then(|w| {
                w.set_interval_with_callback_and_timeout_and_arguments_0(
                    tick.as_ref().unchecked_ref(),
                    interval_ms.min(i32::MAX as u32) as i32,
                )
                .ok()
            })
            .unwrap_or(0);

        let ended = feed
            .stream
            .get_video_tracks()
            .get(0)
            .dyn_into::<web::MediaStreamTrack>()
            .ok()
            .map(|track| {
                let closure = Closure::wrap(Box::new(move || {
                    log::warn!("[face] camera track ended (ticket {})", ticket);
                    driver.dispatch(Message::SourceLost {
                        source: Source::Face,
                        ticket,
                    });
                }) as Box<dyn FnMut()>);
                _ = track.add_event_listener_with_callback("ended", closure.as_ref().unchecked_ref());
                (track, closure)
            });

        log::info!("[face] detection running every {}ms (ticket {})", interval_ms, ticket);
        Self {
            ticket,
            feed,
            interval,
            tick,
            ended,
        }
    }

    /// Synchronously halts polling and releases the camera.
    fn end(self) {
        if let Some(w) = web::window() {
            w.clear_interval_with_handle(self.interval);
        }
        if let Some((track, closure)) = self.ended {
            _ = track.remove_event_listener_with_callback("ended", closure.as_ref().unchecked_ref());
            dom::release_later(closure);
        }
        stop_tracks(&self.feed.stream);
        self.feed.video.set_src_object(None);
        dom::release_later(self.tick);
        log::info!("[face] camera released (ticket {})", self.ticket);
    }
}

/// Face sessions keyed by start ticket. A session only ever ends through
/// its own ticket, so a late result for an old request cannot tear down
/// the live one.
#[derive(Default)]
pub struct FaceTracker {
    sessions: Vec<FaceSession>,
}

impl FaceTracker {
    pub fn install(&mut self, session: FaceSession) {
        if let Some(pos) = self.sessions.iter().position(|s| s.ticket == session.ticket) {
            self.sessions.swap_remove(pos).end();
        }
        self.sessions.push(session);
    }

    pub fn stop(&mut self, ticket: u64) {
        match self.sessions.iter().position(|s| s.ticket == ticket) {
            Some(pos) => self.sessions.swap_remove(pos).end(),
            None => log::debug!("[face] stop for ticket {} with no session", ticket),
        }
    }
}
