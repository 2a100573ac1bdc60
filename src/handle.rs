//! # Single-assignment result slots.
//!
//! Every submitted request is paired with a [`Resolver`] (kept by the processor) and a
//! [`WaitHandle`] (returned to the caller). Both halves share one
//! [`tokio::sync::oneshot`] channel.
//!
//! ## Rules
//! - `Resolver::resolve` / `Resolver::reject` take `self`: a slot can be settled **once**.
//! - A resolver dropped without settling (e.g. the control loop died) settles the handle
//!   with [`RequestError::Canceled`]; no caller is ever left waiting forever.
//! - A caller that drops its handle early is fine; the result is discarded.
//!
//! ```text
//! submit() ──► (Resolver, WaitHandle)
//!                  │           │
//!             queue/batch   caller: handle.await
//!                  │           ▲
//!                  └─ settle ──┘   (exactly once)
//! ```

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use tokio::sync::oneshot;

use crate::error::RequestError;

/// Outcome carried by a slot.
pub type Outcome<T> = Result<T, RequestError>;

/// Creates a connected pending pair.
pub(crate) fn slot<T>() -> (Resolver<T>, WaitHandle<T>) {
    let (tx, rx) = oneshot::channel();
    (Resolver { tx }, WaitHandle { rx })
}

/// Producer half of a slot, owned by the queue and later by the in-flight batch.
#[derive(Debug)]
pub(crate) struct Resolver<T> {
    tx: oneshot::Sender<Outcome<T>>,
}

impl<T> Resolver<T> {
    /// Settles the slot with a value.
    ///
    /// Returns `false` if the caller already dropped its handle.
    pub fn resolve(self, value: T) -> bool {
        self.tx.send(Ok(value)).is_ok()
    }

    /// Settles the slot with an error.
    ///
    /// Returns `false` if the caller already dropped its handle.
    pub fn reject(self, err: RequestError) -> bool {
        self.tx.send(Err(err)).is_ok()
    }
}

/// Caller half of a slot.
///
/// Await it (or call [`get`](WaitHandle::get)) to obtain the result of the request.
///
/// # Example
/// ```rust
/// use batchvisor::{Config, HandlerError, HandlerFn, Processor};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let double = HandlerFn::arc("double", |batch: Vec<u32>| async move {
///     Ok::<_, HandlerError>(batch.into_iter().map(|x| x * 2).collect::<Vec<u32>>())
/// });
/// let processor = Processor::builder(Config::default()).build(double);
/// processor.start()?;
///
/// let handle = processor.submit(21);
/// assert_eq!(handle.await?, 42);
/// processor.shutdown().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
#[must_use = "a WaitHandle does nothing unless awaited"]
pub struct WaitHandle<T> {
    rx: oneshot::Receiver<Outcome<T>>,
}

impl<T> WaitHandle<T> {
    /// Creates a handle that is already rejected.
    pub(crate) fn rejected(err: RequestError) -> Self {
        let (resolver, handle) = slot();
        resolver.reject(err);
        handle
    }

    /// Waits until the slot is settled.
    pub async fn get(self) -> Outcome<T> {
        self.await
    }

    /// Waits until the slot is settled or `timeout` elapses.
    ///
    /// On timeout the request itself is **not** withdrawn: it stays queued (or
    /// in-flight) and its result is discarded once produced.
    pub async fn get_timeout(self, timeout: Duration) -> Outcome<T> {
        match tokio::time::timeout(timeout, self).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(RequestError::Timeout { timeout }),
        }
    }

    /// Blocks the current thread until the slot is settled.
    ///
    /// For synchronous callers only: panics when called from within an async
    /// execution context, like [`oneshot::Receiver::blocking_recv`].
    pub fn blocking_get(self) -> Outcome<T> {
        self.rx.blocking_recv().unwrap_or(Err(RequestError::Canceled))
    }
}

impl<T> Future for WaitHandle<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or(Err(RequestError::Canceled)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_delivers_value() {
        let (resolver, handle) = slot::<u32>();
        assert!(resolver.resolve(7));
        assert_eq!(handle.await, Ok(7));
    }

    #[tokio::test]
    async fn reject_delivers_error() {
        let (resolver, handle) = slot::<u32>();
        resolver.reject(RequestError::Closed);
        assert_eq!(handle.get().await, Err(RequestError::Closed));
    }

    #[tokio::test]
    async fn dropped_resolver_settles_as_canceled() {
        let (resolver, handle) = slot::<u32>();
        drop(resolver);
        assert_eq!(handle.await, Err(RequestError::Canceled));
    }

    #[tokio::test]
    async fn resolve_after_caller_left_reports_false() {
        let (resolver, handle) = slot::<u32>();
        drop(handle);
        assert!(!resolver.resolve(1));
    }

    #[tokio::test(start_paused = true)]
    async fn get_timeout_expires_while_pending() {
        let (_resolver, handle) = slot::<u32>();
        let res = handle.get_timeout(Duration::from_millis(100)).await;
        assert_eq!(
            res,
            Err(RequestError::Timeout {
                timeout: Duration::from_millis(100)
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn get_timeout_returns_settled_value() {
        let (resolver, handle) = slot::<&'static str>();
        resolver.resolve("ok");
        assert_eq!(handle.get_timeout(Duration::from_secs(1)).await, Ok("ok"));
    }

    #[tokio::test]
    async fn pre_rejected_handle() {
        let handle = WaitHandle::<()>::rejected(RequestError::Closed);
        assert_eq!(handle.await, Err(RequestError::Closed));
    }

    #[test]
    fn blocking_get_from_plain_thread() {
        let (resolver, handle) = slot::<u8>();
        let waiter = std::thread::spawn(move || handle.blocking_get());
        resolver.resolve(3);
        assert_eq!(waiter.join().unwrap(), Ok(3));
    }
}
