//! # Non-blocking event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`] — distributes events to multiple subscribers
//! concurrently without blocking the publisher.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     │    (bounded)
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N while B processes N+5
//! - **Overflow**: event dropped for that subscriber only, `SubscriberOverflow` published
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: slow/panicking subscriber doesn't affect others
//! - **Per-subscriber FIFO**: each subscriber sees events in order
//! - **Attribution**: overflow/panic events name the subscriber in `subscriber` and,
//!   for a set built with [`SubscriberSet::for_processor`], the processor in `processor`
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};

use super::Subscribe;

/// Per-subscriber channel with metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
    origin: Option<Arc<str>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        Self::spawn(subs, bus, None)
    }

    /// Like [`new`](Self::new), but stamps `processor` on the overflow/panic events
    /// this set publishes.
    #[must_use]
    pub fn for_processor(
        processor: impl Into<Arc<str>>,
        subs: Vec<Arc<dyn Subscribe>>,
        bus: Bus,
    ) -> Self {
        Self::spawn(subs, bus, Some(processor.into()))
    }

    fn spawn(subs: Vec<Arc<dyn Subscribe>>, bus: Bus, origin: Option<Arc<str>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);
            let bus_for_worker = bus.clone();
            let origin_for_worker = origin.clone();
            let s = Arc::clone(&sub);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = s.on_event(ev.as_ref());

                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = crate::core::panic_message(&*panic_err);
                        let ev = Event::subscriber_panicked(s.name(), info);
                        bus_for_worker.publish(stamp(ev, origin_for_worker.as_ref()));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
            origin,
        }
    }

    /// Emits an event to all subscribers (clones the event once).
    ///
    /// - On queue full: drops event, publishes `SubscriberOverflow`
    /// - On queue closed: publishes `SubscriberOverflow` with reason "closed"
    ///
    /// `SubscriberOverflow` events that overflow themselves are not re-published.
    pub fn emit(&self, event: &Event) {
        let event = Arc::new(event.clone());
        let is_overflow_evt = matches!(event.kind, EventKind::SubscriberOverflow);

        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if is_overflow_evt {
                        eprintln!(
                            "[batchvisor] subscriber '{}' dropped event: queue full",
                            channel.name
                        );
                    } else {
                        self.report(Event::subscriber_overflow(channel.name, "full"));
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    if !is_overflow_evt {
                        self.report(Event::subscriber_overflow(channel.name, "closed"));
                    }
                }
            }
        }
    }

    fn report(&self, ev: Event) {
        self.bus.publish(stamp(ev, self.origin.as_ref()));
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// 1. Drops all channel senders (workers see channel closed)
    /// 2. Awaits all worker tasks to finish (queued events are still delivered)
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

fn stamp(ev: Event, origin: Option<&Arc<str>>) -> Event {
    match origin {
        Some(name) => ev.with_processor(Arc::clone(name)),
        None => ev,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recorder {
        seen: Arc<Mutex<Vec<EventKind>>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    #[tokio::test]
    async fn fans_out_in_order_and_flushes_on_shutdown() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let bus = Bus::new(16);
        let set = SubscriberSet::new(
            vec![Arc::new(Recorder {
                seen: Arc::clone(&seen),
            })],
            bus,
        );
        assert_eq!(set.len(), 1);

        set.emit(&Event::new(EventKind::BatchFormed));
        set.emit(&Event::new(EventKind::BatchCompleted));
        set.shutdown().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventKind::BatchFormed, EventKind::BatchCompleted]
        );
    }

    #[tokio::test]
    async fn panicking_subscriber_is_reported_on_bus() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Exploder)], bus);

        set.emit(&Event::new(EventKind::ProcessorStarted));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.subscriber.as_deref(), Some("exploder"));
        assert_eq!(ev.processor, None);
        assert_eq!(ev.reason.as_deref(), Some("boom"));
        set.shutdown().await;
    }

    struct Stalled;

    #[async_trait]
    impl Subscribe for Stalled {
        async fn on_event(&self, _event: &Event) {
            std::future::pending::<()>().await;
        }

        fn name(&self) -> &'static str {
            "stalled"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn overflow_names_subscriber_and_processor() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::for_processor("ranker", vec![Arc::new(Stalled)], bus);

        // First event parks the worker, second fills the queue, third overflows.
        set.emit(&Event::new(EventKind::BatchFormed));
        tokio::task::yield_now().await;
        set.emit(&Event::new(EventKind::BatchStarting));
        set.emit(&Event::new(EventKind::BatchCompleted));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.subscriber.as_deref(), Some("stalled"));
        assert_eq!(ev.processor.as_deref(), Some("ranker"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=stalled reason=full"));
        assert!(!set.is_empty());
    }
}
