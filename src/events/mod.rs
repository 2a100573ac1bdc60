//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the processor, its control
//! loop, the batch runner and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Processor` (admission, lifecycle), `core::scheduler` (batch
//!   formation, final drain), `core::runner::run_batch` (batch outcome),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the processor's subscriber listener (fans out to `SubscriberSet`)
//!   and any receiver obtained from `Processor::subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
