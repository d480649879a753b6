//! Fan-out of the arbitrated offset to every visual consumer.

use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

use crate::offset::NormalizedOffset;
use crate::smoothing::FrameSmoother;

/// Anything that reinterprets the shared offset once per frame: a camera
/// rig, a parallax layer, an overlay, a shader uniform.
pub trait OffsetConsumer {
    fn set_target_offset(&mut self, offset: NormalizedOffset);
}

/// Lets a consumer stay reachable from the render loop while the
/// broadcaster drives it.
impl<T: OffsetConsumer + ?Sized> OffsetConsumer for Rc<RefCell<T>> {
    fn set_target_offset(&mut self, offset: NormalizedOffset) {
        self.borrow_mut().set_target_offset(offset);
    }
}

/// Consumer-local mapping applied after smoothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shaping {
    pub gain: [f32; 3],
    pub clamp: Option<f32>,
    /// Downstream smoothing factor `s`; `None` forwards the target as is.
    pub smoothing: Option<f32>,
}

impl Default for Shaping {
    fn default() -> Self {
        Self {
            gain: [1.0, 1.0, 1.0],
            clamp: Some(1.0),
            smoothing: None,
        }
    }
}

impl Shaping {
    pub fn smoothed(s: f32) -> Self {
        Self {
            smoothing: Some(s),
            ..Default::default()
        }
    }

    pub fn with_gain(mut self, gain: [f32; 3]) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_clamp(mut self, clamp: Option<f32>) -> Self {
        self.clamp = clamp;
        self
    }

    /// Planar consumer spanning `±extent` on x and y, ignoring depth. The
    /// clamp follows the gain so a sensitivity above 1 cannot overshoot.
    pub fn with_extent(self, extent: f32) -> Self {
        self.with_gain([extent, extent, 0.0]).with_clamp(Some(extent))
    }

    #[inline]
    pub fn apply(&self, o: NormalizedOffset) -> NormalizedOffset {
        let shaped = NormalizedOffset::new(o.x * self.gain[0], o.y * self.gain[1], o.z * self.gain[2]);
        match self.clamp {
            Some(limit) => shaped.clamped(limit),
            None => shaped,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

struct Subscription {
    id: SubscriberId,
    shaping: Shaping,
    smoother: FrameSmoother,
    consumer: Box<dyn OffsetConsumer>,
}

#[derive(Default)]
pub struct Broadcaster {
    subs: SmallVec<[Subscription; 4]>,
    next_id: u32,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, consumer: Box<dyn OffsetConsumer>, shaping: Shaping) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subs.push(Subscription {
            id,
            shaping,
            smoother: FrameSmoother::new(shaping.smoothing.unwrap_or(1.0)),
            consumer,
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subs.len();
        self.subs.retain(|s| s.id != id);
        self.subs.len() != before
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// New raw target from the arbitrator.
    pub fn publish(&mut self, target: NormalizedOffset) {
        for sub in self.subs.iter_mut() {
            sub.smoother.set_target(target);
        }
    }

    /// Advance every subscription by one render frame and hand each consumer
    /// its own shaped copy.
    pub fn frame(&mut self, dt_ms: f32) {
        for sub in self.subs.iter_mut() {
            let value = match sub.shaping.smoothing {
                Some(_) => sub.smoother.step(dt_ms),
                None => {
                    sub.smoother.snap();
                    sub.smoother.value()
                }
            };
            sub.consumer.set_target_offset(sub.shaping.apply(value));
        }
    }
}
