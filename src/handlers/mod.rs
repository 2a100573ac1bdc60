//! # Batch handler abstractions.
//!
//! This module provides the pluggable unit that performs the actual per-batch work:
//! - [`Handler`] - trait for implementing async batch processing
//! - [`HandlerFn`] - function-based handler implementation
//! - [`HandlerRef`] - type-erased shared handler (`Arc<dyn Handler<..>>`)

mod handler;
mod handler_fn;

pub use handler::{Handler, HandlerRef};
pub use handler_fn::HandlerFn;
