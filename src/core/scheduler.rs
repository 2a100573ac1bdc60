//! # Control loop: decides when a batch is formed.
//!
//! The [`Scheduler`] owns the consumer side of the [`AdmissionQueue`] and the
//! [`Executor`]. It is the only place where batches are formed.
//!
//! ## Trigger
//! ```text
//! loop {
//!   ├─ cancelled?                               → exit loop
//!   ├─ arm notify (enable) ─► snapshot (len, oldest arrival)
//!   ├─ len ≥ batch_size                         → form batch
//!   ├─ len > 0 and now ≥ oldest + timeout       → form batch
//!   ├─ len > 0                                  → wait: deadline | enqueue | cancel
//!   └─ len = 0                                  → wait: enqueue | cancel
//!
//!   form batch: drain(batch_size) ─► BatchFormed ─► executor.execute(batch)
//! }
//!
//! after loop (ShutdownPolicy):
//!   Reject → drain_all ─► reject(Canceled) ─► PendingRejected
//!   Flush  → drain(batch_size) repeatedly ─► execute each
//!   then   → wait_idle ─► Stopped ─► ProcessorStopped ─► ctx.stopped fired
//! ```
//!
//! ## Rules
//! - No timer runs while the queue is empty; there is no busy waiting.
//! - The deadline is always derived from the **current** head, so a request never
//!   waits longer than `timeout` plus scheduling latency.
//! - Both triggers form the same batch: up to `batch_size` entries from the head.

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::core::context::Context;
use crate::core::executor::Executor;
use crate::core::queue::{self, AdmissionQueue, Batch};
use crate::error::RequestError;
use crate::events::{Event, EventKind};
use crate::policies::ShutdownPolicy;

pub(crate) struct Scheduler<Req: Send + 'static, Resp: Send + 'static> {
    pub queue: Arc<AdmissionQueue<Req, Resp>>,
    pub executor: Executor<Req, Resp>,
    pub ctx: Arc<Context>,
    pub batch_size: usize,
    pub timeout: Duration,
    pub policy: ShutdownPolicy,
}

impl<Req, Resp> Scheduler<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Runs until `token` is cancelled, then applies the shutdown policy.
    pub async fn run(mut self, token: CancellationToken) {
        let _stopped = self.ctx.stopped.clone().drop_guard();
        // Under Flush, batches already formed must still run; never abort a dispatch.
        let abort = match self.policy {
            ShutdownPolicy::Reject => Some(token.clone()),
            ShutdownPolicy::Flush => None,
        };

        while let Some(batch) = self.next_batch(&token).await {
            self.dispatch(batch, abort.as_ref()).await;
        }

        match self.policy {
            ShutdownPolicy::Reject => {
                let pending = self.queue.drain_all();
                self.reject_pending(pending);
            }
            ShutdownPolicy::Flush => {
                while let Some(batch) = self.queue.drain(self.batch_size) {
                    self.announce(&batch);
                    self.dispatch(batch, None).await;
                }
            }
        }

        self.executor.wait_idle().await;
        self.queue.mark_stopped();
        self.ctx.publish(Event::new(EventKind::ProcessorStopped));
    }

    /// Waits for a trigger and drains the next batch.
    ///
    /// Returns `None` once cancelled.
    async fn next_batch(&self, token: &CancellationToken) -> Option<Batch<Req, Resp>> {
        loop {
            if !self.wait_ready(token).await {
                return None;
            }
            // A concurrent close with take_pending may have emptied the queue.
            if let Some(batch) = self.queue.drain(self.batch_size) {
                self.announce(&batch);
                return Some(batch);
            }
        }
    }

    /// Returns `true` when a batch should be formed, `false` on cancellation.
    async fn wait_ready(&self, token: &CancellationToken) -> bool {
        loop {
            if token.is_cancelled() {
                return false;
            }

            let notified = self.queue.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let (len, oldest) = self.queue.snapshot();
            if len >= self.batch_size {
                return true;
            }

            let deadline = oldest.and_then(|t| t.checked_add(self.timeout));
            match deadline {
                Some(deadline) if Instant::now() >= deadline => return true,
                Some(deadline) => {
                    select! {
                        _ = tokio::time::sleep_until(deadline) => return true,
                        _ = &mut notified => {},
                        _ = token.cancelled() => return false,
                    }
                }
                // Empty queue, or a timeout too large to ever fire.
                None => {
                    select! {
                        _ = &mut notified => {},
                        _ = token.cancelled() => return false,
                    }
                }
            }
        }
    }

    async fn dispatch(&mut self, batch: Batch<Req, Resp>, abort: Option<&CancellationToken>) {
        if let Err(batch) = self.executor.execute(batch, abort).await {
            let pending = batch.reject_all(RequestError::Canceled);
            self.ctx.publish(
                Event::new(EventKind::PendingRejected)
                    .with_size(pending)
                    .with_reason("canceled"),
            );
        }
    }

    fn announce(&self, batch: &Batch<Req, Resp>) {
        self.ctx.publish(
            Event::new(EventKind::BatchFormed)
                .with_batch(batch.id())
                .with_size(batch.len())
                .with_wait(batch.oldest_wait()),
        );
    }

    fn reject_pending(&self, pending: Vec<queue::Pending<Req, Resp>>) {
        let n = queue::reject_all(pending, RequestError::Canceled);
        if n > 0 {
            self.ctx.publish(
                Event::new(EventKind::PendingRejected)
                    .with_size(n)
                    .with_reason("canceled"),
            );
        }
    }
}
