//! # Execution modes for formed batches.
//!
//! [`ExecutionMode`] decides where `Handler::handle` runs once a batch is closed.
//!
//! ```text
//! Sequential               → handle() runs inline on the control loop;
//!                            the next batch is formed only after it returns.
//! Parallel { workers: P }  → handle() runs on a spawned task holding one of P slots;
//!                            the loop keeps forming batches, waiting only when all
//!                            P slots are busy.
//! ```
//!
//! Within one batch, result `i` always belongs to request `i`. Across batches,
//! `Sequential` completes in formation order as a side effect; `Parallel` does not.

/// Strategy used to execute formed batches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// At most one batch executes at a time, on the control loop itself.
    #[default]
    Sequential,
    /// Up to `workers` batches execute concurrently.
    ///
    /// `workers = 0` is treated as `1`.
    Parallel {
        /// Maximum number of concurrently executing batches.
        workers: usize,
    },
}

impl ExecutionMode {
    /// Convenience constructor for [`ExecutionMode::Parallel`].
    #[inline]
    pub fn parallel(workers: usize) -> Self {
        ExecutionMode::Parallel { workers }
    }

    /// Maximum number of batches that may execute at the same time.
    ///
    /// # Example
    /// ```
    /// use batchvisor::ExecutionMode;
    ///
    /// assert_eq!(ExecutionMode::Sequential.concurrency(), 1);
    /// assert_eq!(ExecutionMode::parallel(4).concurrency(), 4);
    /// assert_eq!(ExecutionMode::parallel(0).concurrency(), 1);
    /// ```
    #[inline]
    pub fn concurrency(&self) -> usize {
        match self {
            ExecutionMode::Sequential => 1,
            ExecutionMode::Parallel { workers } => (*workers).max(1),
        }
    }

    /// Short label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Parallel { .. } => "parallel",
        }
    }
}
