//! # Run a single batch through the handler.
//!
//! Executes `Handler::handle` for one [`Batch`], settles every request of it and
//! publishes lifecycle events to the [`Bus`](crate::Bus).
//!
//! ## Event flow
//!
//! ```text
//! Success:
//!   BatchStarting → handle() → Ok(results), len == batch → resolve(i, results[i]) → BatchCompleted
//!
//! Handler error / panic:
//!   BatchStarting → handle() → Err / panic → reject all (Execution)              → BatchFailed
//!
//! Contract violation:
//!   BatchStarting → handle() → Ok(results), len != batch → reject all (Invariant) → BatchFailed
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event: `BatchCompleted` or `BatchFailed`
//! - Every request of the batch is settled exactly once before returning
//! - A panic inside the handler is caught; it never reaches the control loop
//! - Results are never truncated or padded: a length mismatch fails the whole batch

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::time::Instant;

use crate::core::context::Context;
use crate::core::panic_message;
use crate::core::queue::Batch;
use crate::error::RequestError;
use crate::events::{Event, EventKind};
use crate::handlers::HandlerRef;

/// Executes `batch` with `handler` and settles all of its requests.
///
/// Returns the error delivered to the batch, if any.
pub(crate) async fn run_batch<Req, Resp>(
    handler: HandlerRef<Req, Resp>,
    batch: Batch<Req, Resp>,
    ctx: Arc<Context>,
) -> Result<(), RequestError>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    let id = batch.id();
    let size = batch.len();

    ctx.in_flight.insert(id);
    ctx.publish(
        Event::new(EventKind::BatchStarting)
            .with_batch(id)
            .with_size(size),
    );

    let (requests, resolvers) = batch.into_parts();
    let started = Instant::now();
    // `handle` itself may panic before it hands back a future.
    let res = AssertUnwindSafe(async { handler.handle(requests).await })
        .catch_unwind()
        .await;
    let elapsed = started.elapsed();

    let outcome = match res {
        Ok(Ok(results)) if results.len() == size => Ok(results),
        Ok(Ok(results)) => Err(RequestError::Invariant {
            reason: format!(
                "handler '{}' returned {} results for a batch of {size}",
                handler.name(),
                results.len()
            ),
        }),
        Ok(Err(e)) => Err(RequestError::from(e)),
        Err(panic) => Err(RequestError::Execution {
            error: format!("handler panicked: {}", panic_message(&*panic)),
        }),
    };

    let result = match outcome {
        Ok(results) => {
            for (resolver, value) in resolvers.into_iter().zip(results) {
                resolver.resolve(value);
            }
            ctx.publish(
                Event::new(EventKind::BatchCompleted)
                    .with_batch(id)
                    .with_size(size)
                    .with_elapsed(elapsed),
            );
            Ok(())
        }
        Err(err) => {
            for resolver in resolvers {
                resolver.reject(err.clone());
            }
            ctx.publish(
                Event::new(EventKind::BatchFailed)
                    .with_batch(id)
                    .with_size(size)
                    .with_elapsed(elapsed)
                    .with_reason(err.as_message()),
            );
            Err(err)
        }
    };

    ctx.in_flight.remove(id);
    result
}
