//! # Processor configuration.
//!
//! Provides [`Config`] centralized settings for one batch processor.
//!
//! Config is used in two ways:
//! 1. **Processor creation**: `Processor::builder(config)`
//! 2. **Control loop**: batch size, formation timeout, execution mode and shutdown policy
//!
//! ## Sentinel values
//! - `batch_size = 0` → treated as `1`
//! - `timeout = 0s` → flush as soon as anything is queued (no waiting for company)
//! - `bus_capacity = 0` → treated as `1`

use std::time::Duration;

use crate::policies::{ExecutionMode, ShutdownPolicy};

/// Configuration for a batch processor.
///
/// Defines:
/// - **Batch formation**: size threshold and formation timeout
/// - **Execution**: sequential or bounded-parallel handler invocation
/// - **Shutdown behavior**: fate of queued requests and grace period
/// - **Event system**: bus capacity for event delivery
///
/// ## Field semantics
/// - `batch_size`: Maximum (and triggering) batch length (`0` = `1`)
/// - `timeout`: Maximum time the oldest queued request waits before a flush
/// - `mode`: How formed batches are executed
/// - `shutdown`: What `cancel()` does with queued requests
/// - `grace`: Maximum wait for in-flight batches in `shutdown()`
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of queued requests that closes a batch immediately.
    ///
    /// Also the upper bound of every batch handed to the handler.
    pub batch_size: usize,

    /// Batch formation timeout.
    ///
    /// Measured from the arrival of the oldest queued request; when it elapses the
    /// batch is closed with whatever is queued (capped at `batch_size`).
    pub timeout: Duration,

    /// Execution strategy for formed batches.
    pub mode: ExecutionMode,

    /// Fate of queued requests on cancellation.
    pub shutdown: ShutdownPolicy,

    /// Maximum time `shutdown()` waits for the control loop and in-flight batches.
    ///
    /// If exceeded, `shutdown()` returns `RuntimeError::GraceExceeded`; the batches
    /// keep running in the background and still deliver their results.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Sets the formation timeout from (non-negative) real seconds.
    ///
    /// Negative and NaN values are treated as `0`; values too large for a [`Duration`]
    /// (including infinity) disable the time trigger, so only `batch_size` closes a batch.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use batchvisor::Config;
    ///
    /// let cfg = Config::default().with_timeout_secs(0.25);
    /// assert_eq!(cfg.timeout, Duration::from_millis(250));
    /// assert_eq!(Config::default().with_timeout_secs(-1.0).timeout, Duration::ZERO);
    /// ```
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: f64) -> Self {
        self.timeout = if secs > 0.0 {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        self
    }

    /// Returns the batch size clamped to a minimum of 1.
    #[inline]
    pub fn batch_size_clamped(&self) -> usize {
        self.batch_size.max(1)
    }

    /// Returns the number of batches allowed to execute concurrently.
    #[inline]
    pub fn concurrency_limit(&self) -> usize {
        self.mode.concurrency()
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    ///
    /// The `Bus` should use this value to avoid constructing an invalid channel.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `batch_size = 2`
    /// - `timeout = 500ms`
    /// - `mode = ExecutionMode::Sequential`
    /// - `shutdown = ShutdownPolicy::Reject`
    /// - `grace = 60s` (reasonable graceful shutdown window)
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            batch_size: 2,
            timeout: Duration::from_millis(500),
            mode: ExecutionMode::default(),
            shutdown: ShutdownPolicy::default(),
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.batch_size, 2);
        assert_eq!(cfg.timeout, Duration::from_millis(500));
        assert_eq!(cfg.mode, ExecutionMode::Sequential);
        assert_eq!(cfg.shutdown, ShutdownPolicy::Reject);
        assert_eq!(cfg.concurrency_limit(), 1);
    }

    #[test]
    fn sentinels_are_clamped() {
        let cfg = Config {
            batch_size: 0,
            bus_capacity: 0,
            mode: ExecutionMode::parallel(0),
            ..Config::default()
        };
        assert_eq!(cfg.batch_size_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.concurrency_limit(), 1);
    }

    #[test]
    fn timeout_secs_handles_edge_values() {
        assert_eq!(
            Config::default().with_timeout_secs(f64::NAN).timeout,
            Duration::ZERO
        );
        assert_eq!(
            Config::default().with_timeout_secs(f64::INFINITY).timeout,
            Duration::MAX
        );
        assert_eq!(
            Config::default().with_timeout_secs(1.5).timeout,
            Duration::from_millis(1500)
        );
    }
}
