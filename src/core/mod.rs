//! Runtime core: batching and lifecycle.
//!
//! The only public API from this module is [`Processor`] (built with
//! [`ProcessorBuilder`]), its [`Config`] and its [`Lifecycle`] state.
//!
//! Internal modules:
//! - [`queue`]: admission queue, pending entries and batches;
//! - [`scheduler`]: the control loop deciding when a batch is formed;
//! - [`executor`]: sequential or bounded-parallel batch execution;
//! - [`runner`]: runs one batch through the handler and settles its requests;
//! - [`shutdown`]: cross-platform shutdown signal handling;
//! - [`inflight`]: ids of the batches currently executing.

mod builder;
mod config;
mod context;
mod executor;
mod inflight;
mod lifecycle;
mod processor;
mod queue;
mod runner;
mod scheduler;
mod shutdown;

use std::any::Any;

pub use builder::ProcessorBuilder;
pub use config::Config;
pub use lifecycle::Lifecycle;
pub use processor::Processor;

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
