//! # Shutdown policy for requests still queued at cancellation.
//!
//! - [`ShutdownPolicy::Reject`] every queued request is rejected with
//!   [`RequestError::Canceled`](crate::RequestError::Canceled) by `cancel()` itself (default).
//! - [`ShutdownPolicy::Flush`] the control loop dispatches the queued requests in
//!   `batch_size` chunks before stopping.
//!
//! In both cases batches that are already executing finish and deliver their results,
//! and requests submitted after `cancel()` are rejected with
//! [`RequestError::Closed`](crate::RequestError::Closed).
//!
//! ```text
//! cancel()
//!   ├─ Reject → drain_all() → reject(Canceled) ──► Stopped once in-flight batches end
//!   └─ Flush  → loop: drain(batch_size) → execute ... until empty ──► Stopped
//! ```

/// Fate of queued requests when the processor is cancelled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShutdownPolicy {
    /// Reject queued requests immediately (bounded shutdown latency).
    #[default]
    Reject,
    /// Execute queued requests before stopping (graceful drain).
    Flush,
}
