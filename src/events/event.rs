//! # Runtime events emitted by a batch processor.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Admission events**: requests refused at the door
//! - **Batch events**: formation, start and outcome of every batch
//! - **Lifecycle events**: start, shutdown and final drain of the processor
//! - **Subscriber events**: overflow/panic inside subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, processor
//! name, batch id and size, waiting/execution times and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use batchvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BatchFailed)
//!     .with_processor("embedder")
//!     .with_batch(7)
//!     .with_size(4)
//!     .with_elapsed(Duration::from_millis(12))
//!     .with_reason("cuda out of memory");
//!
//! assert_eq!(ev.kind, EventKind::BatchFailed);
//! assert_eq!(ev.processor.as_deref(), Some("embedder"));
//! assert_eq!(ev.elapsed_ms, Some(12));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `processor`: processor the subscriber is attached to, if known
    /// - `subscriber`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `processor`: processor the subscriber is attached to, if known
    /// - `subscriber`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Admission events ===
    /// A submission was refused because the processor is stopping or stopped.
    ///
    /// Sets:
    /// - `processor`: processor name
    /// - `reason`: `"closed"`
    RequestRejected,

    // === Batch events ===
    /// A batch was drained from the admission queue.
    ///
    /// Sets:
    /// - `processor`: processor name
    /// - `batch`: batch id
    /// - `size`: batch length
    /// - `wait_ms`: queueing time of the oldest request in the batch (ms)
    BatchFormed,

    /// A batch was handed to the handler.
    ///
    /// Sets:
    /// - `processor`: processor name
    /// - `batch`: batch id
    /// - `size`: batch length
    BatchStarting,

    /// The handler returned results for every request of the batch.
    ///
    /// Sets:
    /// - `processor`: processor name
    /// - `batch`: batch id
    /// - `size`: batch length
    /// - `elapsed_ms`: handler execution time (ms)
    BatchCompleted,

    /// The batch failed as a whole (handler error, panic or contract violation).
    ///
    /// Sets:
    /// - `processor`: processor name
    /// - `batch`: batch id
    /// - `size`: batch length
    /// - `elapsed_ms`: handler execution time (ms), if the handler ran
    /// - `reason`: failure message
    BatchFailed,

    // === Lifecycle events ===
    /// The control loop was started.
    ///
    /// Sets:
    /// - `size`: configured batch size
    /// - `reason`: execution mode label
    ProcessorStarted,

    /// `cancel()` was called; admission is closed.
    ShutdownRequested,

    /// Requests still queued at shutdown were rejected.
    ///
    /// Sets:
    /// - `size`: number of rejected requests
    /// - `reason`: rejection reason
    PendingRejected,

    /// The control loop finished; no batch will start anymore.
    ProcessorStopped,

    /// All in-flight batches completed within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some batches were still executing.
    ///
    /// Sets:
    /// - `size`: number of batches still in flight
    /// - `elapsed_ms`: grace period (ms)
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the emitting processor.
    pub processor: Option<Arc<str>>,
    /// Name of the subscriber, for subscriber events.
    pub subscriber: Option<Arc<str>>,
    /// Batch id, if applicable.
    pub batch: Option<u64>,
    /// Batch length or request count.
    pub size: Option<u32>,
    /// Queueing time in milliseconds (compact).
    pub wait_ms: Option<u32>,
    /// Execution time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            processor: None,
            subscriber: None,
            batch: None,
            size: None,
            wait_ms: None,
            elapsed_ms: None,
            reason: None,
        }
    }

    /// Attaches a processor name.
    #[inline]
    pub fn with_processor(mut self, name: impl Into<Arc<str>>) -> Self {
        self.processor = Some(name.into());
        self
    }

    /// Attaches a subscriber name.
    #[inline]
    pub fn with_subscriber(mut self, name: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(name.into());
        self
    }

    /// Attaches a batch id.
    #[inline]
    pub fn with_batch(mut self, id: u64) -> Self {
        self.batch = Some(id);
        self
    }

    /// Attaches a batch length or request count.
    #[inline]
    pub fn with_size(mut self, n: usize) -> Self {
        self.size = Some(n.min(u32::MAX as usize) as u32);
        self
    }

    /// Attaches a queueing time (stored as milliseconds).
    #[inline]
    pub fn with_wait(mut self, d: Duration) -> Self {
        self.wait_ms = Some(millis(d));
        self
    }

    /// Attaches an execution time (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(millis(d));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subscriber(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subscriber(subscriber)
            .with_reason(info)
    }

    /// True for events describing a batch.
    #[inline]
    pub fn is_batch(&self) -> bool {
        matches!(
            self.kind,
            EventKind::BatchFormed
                | EventKind::BatchStarting
                | EventKind::BatchCompleted
                | EventKind::BatchFailed
        )
    }
}

fn millis(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_increases() {
        let a = Event::new(EventKind::ProcessorStarted);
        let b = Event::new(EventKind::ProcessorStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn durations_saturate_at_u32() {
        let ev = Event::new(EventKind::BatchCompleted).with_elapsed(Duration::from_secs(u64::MAX));
        assert_eq!(ev.elapsed_ms, Some(u32::MAX));
    }

    #[test]
    fn subscriber_events_are_not_batch_events() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(!ev.is_batch());
        assert_eq!(ev.subscriber.as_deref(), Some("audit"));
        assert_eq!(ev.processor, None);
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
    }
}
