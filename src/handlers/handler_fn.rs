//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(Vec<Req>) -> Fut`, producing a fresh future
//! per batch. No hidden state is shared between batches; if the closure needs a model
//! or a connection pool, capture an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use batchvisor::{Handler, HandlerError, HandlerFn};
//!
//! let lengths = HandlerFn::arc("lengths", |batch: Vec<String>| async move {
//!     Ok::<_, HandlerError>(batch.iter().map(|s| s.len()).collect::<Vec<usize>>())
//! });
//!
//! assert_eq!(lengths.name(), "lengths");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::handlers::handler::Handler;

/// Function-backed handler implementation.
///
/// Wraps a closure that *creates* a new future per batch.
pub struct HandlerFn<F, Req, Resp> {
    name: Cow<'static, str>,
    f: F,
    _io: PhantomData<fn(Vec<Req>) -> Vec<Resp>>,
}

impl<F, Fut, Req, Resp> HandlerFn<F, Req, Resp>
where
    F: Fn(Vec<Req>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<Resp>, HandlerError>> + Send + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a shared handle.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _io: PhantomData,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut, Req, Resp> Handler for HandlerFn<F, Req, Resp>
where
    F: Fn(Vec<Req>) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<Vec<Resp>, HandlerError>> + Send + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
{
    type Request = Req;
    type Response = Resp;

    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, batch: Vec<Req>) -> Result<Vec<Resp>, HandlerError> {
        (self.f)(batch).await
    }
}
