use super::{Emission, Lifecycle, Phase};
use crate::offset::NormalizedOffset;

#[derive(Debug, Default)]
pub struct PointerEstimator {
    lifecycle: Lifecycle,
    viewport: [f32; 2],
}

impl PointerEstimator {
    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn start(&mut self) {
        self.lifecycle.begin();
        self.lifecycle.resolve(true);
    }

    pub fn stop(&mut self) -> bool {
        self.lifecycle.stop()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = [width, height];
    }

    pub fn viewport(&self) -> [f32; 2] {
        self.viewport
    }

    /// Viewport pixels → offset with screen-up positive. No depth axis.
    pub fn map(&self, px: f32, py: f32) -> Emission {
        let [w, h] = self.viewport;
        if !(w > 0.0 && h > 0.0) || !px.is_finite() || !py.is_finite() {
            return None;
        }
        let x = (px / w) * 2.0 - 1.0;
        let y = -((py / h) * 2.0 - 1.0);
        Some(NormalizedOffset::new(x, y, 0.0).clamped(1.0))
    }

    pub fn process(&mut self, px: f32, py: f32) -> Emission {
        if !self.lifecycle.is_running() {
            return None;
        }
        self.map(px, py)
    }
}
