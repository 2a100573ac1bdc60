//! Execution and shutdown policies.
//!
//! This module groups the knobs that control **how** formed batches are executed
//! and **what happens** to queued requests when the processor stops.
//!
//! ## Contents
//! - [`ExecutionMode`] sequential (one batch at a time) or bounded-parallel execution
//! - [`ShutdownPolicy`] reject queued requests immediately or flush them through the handler
//!
//! ## Quick wiring
//! ```text
//! Config { mode: ExecutionMode, shutdown: ShutdownPolicy, .. }
//!      └─► core::scheduler uses:
//!           - mode to build the executor (inline vs. worker slots)
//!           - shutdown to decide the fate of the final drain
//! ```
//!
//! ## Defaults
//! - `ExecutionMode::Sequential` (full exclusivity over the handler's resources).
//! - `ShutdownPolicy::Reject` (bounded shutdown latency).

mod execution;
mod shutdown;

pub use execution::ExecutionMode;
pub use shutdown::ShutdownPolicy;
