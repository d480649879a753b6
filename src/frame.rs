use std::cell::RefCell;
use std::rc::Rc;

use instant::Instant;
use parallax_core::CameraRig;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::MAX_FRAME_MS;
use crate::driver::Driver;
use crate::render;

pub struct FrameContext<'a> {
    pub driver: Driver,
    pub canvas: web::HtmlCanvasElement,
    pub rig: Rc<RefCell<CameraRig>>,
    pub spotlight: Rc<RefCell<render::Spotlight>>,
    pub gpu: Option<render::GpuState<'a>>,
    pub last_instant: Instant,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = now - self.last_instant;
        self.last_instant = now;
        // A hidden tab resumes as one long frame, not a jump.
        let dt_ms = (dt.as_secs_f32() * 1000.0).min(MAX_FRAME_MS);

        self.driver.frame(dt_ms);

        let w = self.canvas.width();
        let h = self.canvas.height();
        self.rig.borrow_mut().set_aspect(w as f32, h as f32);
        if let Some(g) = &mut self.gpu {
            g.resize_if_needed(w, h);
            if let Err(e) = g.render(dt_ms / 1000.0, &self.rig.borrow(), &self.spotlight.borrow()) {
                log::error!("render error: {:?}", e);
            }
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
