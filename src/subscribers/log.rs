//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos; implement a custom [`Subscribe`] for structured
//! logging or metrics collection.
//!
//! ## Example output
//! ```text
//! [started] processor="ssd"
//! [formed] processor="ssd" batch=3 size=2 wait_ms=12
//! [starting] processor="ssd" batch=3 size=2
//! [completed] processor="ssd" batch=3 size=2 elapsed_ms=840
//! [failed] processor="ssd" batch=4 size=1 err="cuda out of memory"
//! [rejected] processor="ssd" reason="closed"
//! [shutdown-requested] processor="ssd"
//! [pending-rejected] processor="ssd" count=5
//! [stopped] processor="ssd"
//! ```

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let p = e.processor.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::ProcessorStarted => println!("[started] processor={p:?}"),
            EventKind::BatchFormed => println!(
                "[formed] processor={p:?} batch={:?} size={:?} wait_ms={:?}",
                e.batch, e.size, e.wait_ms
            ),
            EventKind::BatchStarting => println!(
                "[starting] processor={p:?} batch={:?} size={:?}",
                e.batch, e.size
            ),
            EventKind::BatchCompleted => println!(
                "[completed] processor={p:?} batch={:?} size={:?} elapsed_ms={:?}",
                e.batch, e.size, e.elapsed_ms
            ),
            EventKind::BatchFailed => println!(
                "[failed] processor={p:?} batch={:?} size={:?} err={:?}",
                e.batch, e.size, e.reason
            ),
            EventKind::RequestRejected => {
                println!("[rejected] processor={p:?} reason={:?}", e.reason)
            }
            EventKind::ShutdownRequested => println!("[shutdown-requested] processor={p:?}"),
            EventKind::PendingRejected => {
                println!("[pending-rejected] processor={p:?} count={:?}", e.size)
            }
            EventKind::ProcessorStopped => println!("[stopped] processor={p:?}"),
            EventKind::AllStoppedWithin => println!("[all-stopped-within-grace] processor={p:?}"),
            EventKind::GraceExceeded => println!("[grace-exceeded] processor={p:?}"),
            EventKind::SubscriberOverflow => {
                let sub = e.subscriber.as_deref().unwrap_or("unknown");
                println!(
                    "[subscriber-overflow] processor={p:?} subscriber={sub:?} reason={:?}",
                    e.reason
                )
            }
            EventKind::SubscriberPanicked => {
                let sub = e.subscriber.as_deref().unwrap_or("unknown");
                println!(
                    "[subscriber-panicked] processor={p:?} subscriber={sub:?} info={:?}",
                    e.reason
                )
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
