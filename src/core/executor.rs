//! # Batch executors: where `Handler::handle` runs.
//!
//! [`Executor`] is built from [`ExecutionMode`] and owned by the control loop.
//!
//! ```text
//! Sequential:
//!   loop ─► execute(batch) ─► run_batch().await ─► (next batch formed only now)
//!
//! Parallel { workers: P }:
//!   loop ─► execute(batch) ─► acquire slot (1 of P) ─► spawn(run_batch) ─► return
//!                                   │                        └─ slot released on completion
//!                                   └─ abort token fired while saturated → batch handed back
//! ```
//!
//! ## Rules
//! - Sequential never runs two batches at once; completion order equals formation order.
//! - Parallel never runs more than `P` batches at once and does not order completions.
//! - `wait_idle()` returns once every batch started by this executor has completed.

use std::sync::Arc;

use tokio::{select, sync::Semaphore, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::core::Config;
use crate::core::context::Context;
use crate::core::queue::Batch;
use crate::core::runner::run_batch;
use crate::handlers::HandlerRef;
use crate::policies::ExecutionMode;

/// Execution strategy owned by the control loop.
pub(crate) enum Executor<Req: Send + 'static, Resp: Send + 'static> {
    Sequential(Sequential<Req, Resp>),
    Parallel(Parallel<Req, Resp>),
}

impl<Req, Resp> Executor<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    pub fn new(cfg: &Config, handler: HandlerRef<Req, Resp>, ctx: Arc<Context>) -> Self {
        match cfg.mode {
            ExecutionMode::Sequential => Executor::Sequential(Sequential { handler, ctx }),
            ExecutionMode::Parallel { .. } => Executor::Parallel(Parallel {
                handler,
                ctx,
                slots: Arc::new(Semaphore::new(cfg.concurrency_limit())),
                running: JoinSet::new(),
            }),
        }
    }

    /// Starts `batch`.
    ///
    /// Hands the batch back untouched if `abort` fires before it could start.
    pub async fn execute(
        &mut self,
        batch: Batch<Req, Resp>,
        abort: Option<&CancellationToken>,
    ) -> Result<(), Batch<Req, Resp>> {
        match self {
            Executor::Sequential(s) => {
                s.execute(batch).await;
                Ok(())
            }
            Executor::Parallel(p) => p.execute(batch, abort).await,
        }
    }

    /// Waits until no batch started by this executor is running.
    pub async fn wait_idle(&mut self) {
        match self {
            Executor::Sequential(_) => {}
            Executor::Parallel(p) => p.wait_idle().await,
        }
    }
}

/// Runs batches inline on the control loop.
pub(crate) struct Sequential<Req: Send + 'static, Resp: Send + 'static> {
    handler: HandlerRef<Req, Resp>,
    ctx: Arc<Context>,
}

impl<Req, Resp> Sequential<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    async fn execute(&self, batch: Batch<Req, Resp>) {
        let _ = run_batch(Arc::clone(&self.handler), batch, Arc::clone(&self.ctx)).await;
    }
}

/// Runs batches on spawned tasks, at most `P` at a time.
pub(crate) struct Parallel<Req: Send + 'static, Resp: Send + 'static> {
    handler: HandlerRef<Req, Resp>,
    ctx: Arc<Context>,
    slots: Arc<Semaphore>,
    running: JoinSet<()>,
}

impl<Req, Resp> Parallel<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    async fn execute(
        &mut self,
        batch: Batch<Req, Resp>,
        abort: Option<&CancellationToken>,
    ) -> Result<(), Batch<Req, Resp>> {
        // Reap finished batches so the set does not grow unbounded.
        while self.running.try_join_next().is_some() {}

        let acquire = Arc::clone(&self.slots).acquire_owned();
        let permit = match abort {
            Some(token) => select! {
                biased;
                res = acquire => res.ok(),
                _ = token.cancelled() => None,
            },
            None => acquire.await.ok(),
        };
        let Some(permit) = permit else {
            return Err(batch);
        };

        let handler = Arc::clone(&self.handler);
        let ctx = Arc::clone(&self.ctx);
        self.running.spawn(async move {
            let _permit = permit;
            let _ = run_batch(handler, batch, ctx).await;
        });
        Ok(())
    }

    async fn wait_idle(&mut self) {
        while self.running.join_next().await.is_some() {}
    }
}
