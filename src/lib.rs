#![cfg(target_arch = "wasm32")]
use instant::Instant;
use parallax_core::{CameraRig, Pipeline, Shaping, TrackingConfig};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod constants;
mod dom;
mod driver;
mod events;
mod face;
mod frame;
mod input;
mod overlay;
mod probe;
mod render;

use constants::{
    CANVAS_ID, CONFIG_GLOBAL, LAYER_ROTATION_DEG, OVERLAY_SHIFT_PX, OVERLAY_SMOOTHING_SCALE,
    SPOTLIGHT_TRAVEL,
};

fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

/// Reads `window.PARALLAX_CONFIG`. Missing means defaults; anything that
/// fails to parse or validate is reported and replaced by defaults.
fn load_config(window: &web::Window) -> TrackingConfig {
    let raw = match js_sys::Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL)) {
        Ok(v) if !v.is_undefined() && !v.is_null() => v,
        _ => return TrackingConfig::default(),
    };
    let parsed = js_sys::JSON::stringify(&raw)
        .map_err(|e| anyhow::anyhow!("{:?}", e))
        .and_then(|s| {
            let text: String = s.into();
            serde_json::from_str::<TrackingConfig>(&text).map_err(anyhow::Error::from)
        })
        .and_then(|cfg| cfg.validate().map(|_| cfg).map_err(anyhow::Error::from));
    match parsed {
        Ok(cfg) => {
            log::info!("[driver] using page configuration");
            cfg
        }
        Err(e) => {
            log::warn!("[driver] ignoring window.{CONFIG_GLOBAL}: {e}");
            TrackingConfig::default()
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("parallax-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{CANVAS_ID}"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    // Maintain canvas internal pixel size to match CSS size * devicePixelRatio
    wire_canvas_resize(&canvas);

    let config = load_config(&window);
    let caps = probe::capabilities();
    log::info!("[driver] capabilities: {:?} ({:?})", caps, caps.device_class());

    let smoothing = config.smoothing;
    let pipeline = Rc::new(RefCell::new(Pipeline::new(config.clone(), caps)?));

    // Consumers: each gets its own shaped, smoothed copy of the offset.
    let rig = Rc::new(RefCell::new(CameraRig::default()));
    let spotlight = Rc::new(RefCell::new(render::Spotlight::default()));
    {
        let mut p = pipeline.borrow_mut();
        p.subscribe(Box::new(rig.clone()), Shaping::smoothed(smoothing));
        p.subscribe(
            Box::new(spotlight.clone()),
            Shaping::smoothed(smoothing)
                .with_extent(SPOTLIGHT_TRAVEL),
        );
        if let Some(shift) = overlay::OverlayShift::find(&document) {
            p.subscribe(
                Box::new(shift),
                Shaping::smoothed(smoothing * OVERLAY_SMOOTHING_SCALE)
                    .with_extent(OVERLAY_SHIFT_PX),
            );
        }
        if let Some(layers) = overlay::ParallaxLayers::find(&document) {
            p.subscribe(
                Box::new(layers),
                Shaping::smoothed(smoothing)
                    .with_extent(LAYER_ROTATION_DEG),
            );
        }
    }

    let driver = driver::Driver::new(pipeline, config, document.clone());
    events::wire_pointer(&driver);
    events::wire_viewport_resize(&driver);
    events::wire_global_keydown(&driver);
    events::wire_reduced_motion(&driver);
    events::wire_permission_button(&document, &driver);
    driver.setup();

    let gpu = frame::init_gpu(&canvas).await;
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        driver,
        canvas,
        rig,
        spotlight,
        gpu,
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);

    Ok(())
}
