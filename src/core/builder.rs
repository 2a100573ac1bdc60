use std::borrow::Cow;
use std::sync::Arc;

use crate::{
    core::{Config, context::Context, processor::Processor},
    events::Bus,
    handlers::{Handler, HandlerRef},
    subscribers::Subscribe,
};

/// Builder for constructing a [`Processor`] with optional features.
pub struct ProcessorBuilder {
    cfg: Config,
    name: Option<Cow<'static, str>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ProcessorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            name: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the processor name stamped on every event.
    ///
    /// Defaults to [`Handler::name`].
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive processor events (batch lifecycle, rejections, shutdown)
    /// through dedicated workers with bounded queues, starting with `start()`.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the processor around `handler`.
    ///
    /// The processor is returned in `Init`: requests may be submitted right away but
    /// no batch is formed before [`Processor::start`].
    pub fn build<H: Handler>(self, handler: Arc<H>) -> Arc<Processor<H::Request, H::Response>> {
        let name: Arc<str> = match &self.name {
            Some(name) => Arc::from(name.as_ref()),
            None => Arc::from(handler.name()),
        };
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let ctx = Arc::new(Context::new(bus, name));
        let handler: HandlerRef<H::Request, H::Response> = handler;

        Arc::new(Processor::new_internal(
            self.cfg,
            handler,
            ctx,
            self.subscribers,
        ))
    }
}
