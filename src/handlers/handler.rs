//! # Handler abstraction.
//!
//! A [`Handler`] turns a batch of requests into a batch of responses. The processor
//! treats it as opaque: it may run a neural network on a GPU, issue one bulk SQL
//! query, or anything else whose fixed cost benefits from batching.
//!
//! ## Contract
//! - `handle(batch)` returns exactly `batch.len()` responses; response `i` belongs to
//!   request `i`. Anything else rejects the whole batch with
//!   [`RequestError::Invariant`](crate::RequestError::Invariant).
//! - An `Err` (or a panic) fails the whole batch; every request in it receives
//!   [`RequestError::Execution`](crate::RequestError::Execution).
//! - With [`ExecutionMode::Parallel`](crate::ExecutionMode::Parallel) several calls may
//!   run concurrently, so `&self` state must be safe to share.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;

/// Shared, type-erased handle to a handler serving `Req → Resp`.
pub type HandlerRef<Req, Resp> = Arc<dyn Handler<Request = Req, Response = Resp>>;

/// # Asynchronous batch processing unit.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use batchvisor::{Handler, HandlerError};
///
/// struct Uppercase;
///
/// #[async_trait]
/// impl Handler for Uppercase {
///     type Request = String;
///     type Response = String;
///
///     fn name(&self) -> &str { "uppercase" }
///
///     async fn handle(&self, batch: Vec<String>) -> Result<Vec<String>, HandlerError> {
///         Ok(batch.into_iter().map(|s| s.to_uppercase()).collect())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Payload submitted by one caller.
    type Request: Send + 'static;
    /// Result delivered to one caller.
    type Response: Send + 'static;

    /// Returns a stable, human-readable handler name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Processes one batch (`1 ≤ batch.len() ≤ batch_size`), preserving positions.
    async fn handle(
        &self,
        batch: Vec<Self::Request>,
    ) -> Result<Vec<Self::Response>, HandlerError>;
}
