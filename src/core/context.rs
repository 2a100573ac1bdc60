//! # Per-processor runtime context.
//!
//! Everything the facade, the control loop and the batch runner share besides the
//! queue: the event bus, the processor name stamped on every event, the in-flight
//! tracker and two tokens: one fired once the control loop has stopped, one that
//! ends the subscriber listener.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::inflight::InFlight;
use crate::events::{Bus, Event};

pub(crate) struct Context {
    pub bus: Bus,
    pub name: Arc<str>,
    pub in_flight: InFlight,
    /// Cancelled once the control loop has published `ProcessorStopped` (or the
    /// processor was cancelled before it ever started).
    pub stopped: CancellationToken,
    /// Cancelled once no more events will be forwarded to subscribers.
    pub done: CancellationToken,
}

impl Context {
    pub fn new(bus: Bus, name: Arc<str>) -> Self {
        Self {
            bus,
            name,
            in_flight: InFlight::default(),
            stopped: CancellationToken::new(),
            done: CancellationToken::new(),
        }
    }

    /// Publishes `ev` stamped with this processor's name.
    pub fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_processor(Arc::clone(&self.name)));
    }
}
