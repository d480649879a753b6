use crate::arbitrator::{Arbitrator, CoordinatorState, Effect, Message};
use crate::broadcast::{Broadcaster, OffsetConsumer, Shaping, SubscriberId};
use crate::capability::Capabilities;
use crate::config::TrackingConfig;
use crate::error::Result;
use crate::estimator::Source;

/// Arbitrator plus broadcast layer. The arbitrator is the only path into
/// the broadcaster, so readings from an inactive source never reach a
/// consumer.
pub struct Pipeline {
    arbitrator: Arbitrator,
    broadcaster: Broadcaster,
}

impl Pipeline {
    pub fn new(config: TrackingConfig, caps: Capabilities) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            arbitrator: Arbitrator::new(config, caps),
            broadcaster: Broadcaster::new(),
        })
    }

    pub fn setup(&mut self) {
        self.arbitrator.setup();
    }

    pub fn dispatch(&mut self, msg: Message) {
        if let Some(offset) = self.arbitrator.handle(msg) {
            if offset.is_finite() {
                self.broadcaster.publish(offset);
            }
        }
    }

    /// One render frame: lets frame-driven sources advance, then eases every
    /// consumer toward the latest target.
    pub fn frame(&mut self, dt_ms: f32) {
        self.dispatch(Message::Frame { dt_ms });
        self.broadcaster.frame(dt_ms);
    }

    pub fn subscribe(&mut self, consumer: Box<dyn OffsetConsumer>, shaping: Shaping) -> SubscriberId {
        self.broadcaster.subscribe(consumer, shaping)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.broadcaster.unsubscribe(id)
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.arbitrator.take_effects()
    }

    pub fn state(&self) -> CoordinatorState {
        self.arbitrator.state()
    }

    pub fn active_source(&self) -> Option<Source> {
        self.arbitrator.active_source()
    }

    pub fn arbitrator(&self) -> &Arbitrator {
        &self.arbitrator
    }
}
