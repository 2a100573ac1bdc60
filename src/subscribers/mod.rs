//! # Event subscribers for the batchvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! built-in implementations for handling runtime events broadcast through the
//! [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   control loop ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet
//!                                                                           │
//!                                                            ┌──────────────┼──────────┐
//!                                                            ▼              ▼          ▼
//!                                                        LogWriter       Metrics    Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use batchvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct BatchSizes;
//!
//! #[async_trait]
//! impl Subscribe for BatchSizes {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::BatchFormed {
//!             // record histogram of event.size
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "batch-sizes"
//!     }
//! }
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
