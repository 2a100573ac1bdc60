//! # batchvisor
//!
//! **Batchvisor** is a dynamic request batching library for async Rust.
//!
//! Many concurrent, independent callers each submit **one** request and await **one**
//! result. Behind the scenes requests are grouped into bounded batches so that an
//! expensive per-batch operation (model inference, a bulk database call, ...) amortizes
//! its fixed overhead. Callers are unaware of batching.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller #1        caller #2        caller #3
//!      │ submit(req)    │ submit(req)    │ submit(req)
//!      ▼                ▼                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Processor (facade)                                               │
//! │  - AdmissionQueue (FIFO of request + result slot + arrival)       │
//! │  - Lifecycle (Init → Running → Stopping → Stopped)                │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        │ WaitHandle (returned immediately)                │ drain(batch_size)
//!        ▼                                                  ▼
//!   caller awaits                          ┌────────────────────────────────┐
//!        ▲                                 │  Scheduler (control loop)      │
//!        │                                 │  size trigger | timeout trigger│
//!        │                                 └───────────────┬────────────────┘
//!        │                                                 ▼
//!        │                                 ┌────────────────────────────────┐
//!        │                                 │  Executor                      │
//!        │                                 │  Sequential | Parallel{P}      │
//!        │                                 └───────────────┬────────────────┘
//!        │                                                 ▼
//!        │      resolve(i, results[i])     ┌────────────────────────────────┐
//!        └─────────────────────────────────│  Handler::handle(Vec<Req>)     │
//!               or reject all              │  → Vec<Resp> (same length)     │
//!                                          └────────────────────────────────┘
//!
//! Events: Processor / Scheduler / runner ── publish ──► Bus ──► SubscriberSet
//!                                                              ┌────┼────┐
//!                                                              ▼    ▼    ▼
//!                                                           sub1  sub2  subN
//! ```
//!
//! ### Batch formation
//! ```text
//! loop {
//!   ├─► wait until: len ≥ batch_size  OR  now ≥ oldest_arrival + timeout  OR  cancel()
//!   ├─► drain up to batch_size requests from the head (FIFO)
//!   ├─► publish BatchFormed{ batch, size, wait_ms }
//!   └─► executor.execute(batch)
//!         ├─ Ok(results), len matches ─► resolve each handle positionally ─► BatchCompleted
//!         ├─ Err / panic              ─► reject all with Execution        ─► BatchFailed
//!         └─ length mismatch          ─► reject all with Invariant        ─► BatchFailed
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                          | Key types / traits                      |
//! |-------------------|----------------------------------------------------------------------|-----------------------------------------|
//! | **Processor**     | Submit requests, start/cancel/shutdown the batching loop.            | [`Processor`], [`ProcessorBuilder`]     |
//! | **Handlers**      | Pluggable per-batch operation, as a trait or a closure.              | [`Handler`], [`HandlerFn`]              |
//! | **Results**       | Per-request single-assignment result slot.                           | [`WaitHandle`], [`Outcome`]             |
//! | **Policies**      | Sequential or bounded-parallel execution; reject or flush on stop.   | [`ExecutionMode`], [`ShutdownPolicy`]   |
//! | **Subscriber API**| Hook into batch and lifecycle events (logging, metrics).             | [`Subscribe`], [`Event`]                |
//! | **Errors**        | Typed errors for callers, handlers and the runtime.                  | [`RequestError`], [`RuntimeError`]      |
//! | **Configuration** | Centralize batching settings.                                        | [`Config`]                              |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use batchvisor::{Config, HandlerError, HandlerFn, Processor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.batch_size = 8;
//!     cfg.timeout = Duration::from_millis(20);
//!
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn batchvisor::Subscribe>> = {
//!         use batchvisor::LogWriter;
//!         vec![Arc::new(LogWriter::default())]
//!     };
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn batchvisor::Subscribe>> = Vec::new();
//!
//!     // One call per batch, one result per request, same order.
//!     let upper = HandlerFn::arc("upper", |batch: Vec<String>| async move {
//!         Ok::<_, HandlerError>(batch.iter().map(|s| s.to_uppercase()).collect::<Vec<String>>())
//!     });
//!
//!     let processor = Processor::builder(cfg)
//!         .with_subscribers(subs)
//!         .build(upper);
//!     processor.start()?;
//!
//!     let a = processor.submit("hello".to_string());
//!     let b = processor.submit("world".to_string());
//!     assert_eq!(a.await?, "HELLO");
//!     assert_eq!(b.await?, "WORLD");
//!
//!     processor.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod handle;
mod handlers;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use core::{Config, Lifecycle, Processor, ProcessorBuilder};
pub use error::{HandlerError, RequestError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use handle::{Outcome, WaitHandle};
pub use handlers::{Handler, HandlerFn, HandlerRef};
pub use policies::{ExecutionMode, ShutdownPolicy};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
