//! Error types used by the batchvisor runtime, its handlers and its callers.
//!
//! This module defines three enums:
//!
//! - [`RequestError`] — the outcome delivered to a single caller through its
//!   [`WaitHandle`](crate::WaitHandle) when the request could not be served.
//! - [`HandlerError`] — errors raised by a [`Handler`](crate::Handler) for a whole batch.
//! - [`RuntimeError`] — errors raised by the processor lifecycle itself.
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors delivered to an individual caller.
///
/// A rejected [`WaitHandle`](crate::WaitHandle) carries one of these. Every request of
/// a failed batch receives a clone of the same error, because a batch-level failure
/// cannot be attributed to a single request.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The processor was already stopping or stopped when the request was submitted.
    #[error("processor closed")]
    Closed,

    /// The handler failed (returned an error or panicked) for the batch containing this request.
    #[error("batch execution failed: {error}")]
    Execution {
        /// The underlying error message.
        error: String,
    },

    /// The request was still queued when the processor shut down.
    #[error("request cancelled by processor shutdown")]
    Canceled,

    /// The handler broke its contract (e.g. returned a result count different from the batch length).
    #[error("handler contract violated: {reason}")]
    Invariant {
        /// What exactly was violated.
        reason: String,
    },

    /// The caller stopped waiting after the given duration (see [`WaitHandle::get_timeout`](crate::WaitHandle::get_timeout)).
    #[error("no result within {timeout:?}")]
    Timeout {
        /// The duration the caller was willing to wait.
        timeout: Duration,
    },
}

impl RequestError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use batchvisor::RequestError;
    ///
    /// assert_eq!(RequestError::Closed.as_label(), "request_closed");
    /// assert_eq!(RequestError::Canceled.as_label(), "request_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RequestError::Closed => "request_closed",
            RequestError::Execution { .. } => "request_execution_failed",
            RequestError::Canceled => "request_canceled",
            RequestError::Invariant { .. } => "request_invariant_violated",
            RequestError::Timeout { .. } => "request_timeout",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RequestError::Closed => "processor closed".to_string(),
            RequestError::Execution { error } => format!("execution: {error}"),
            RequestError::Canceled => "cancelled on shutdown".to_string(),
            RequestError::Invariant { reason } => format!("invariant: {reason}"),
            RequestError::Timeout { timeout } => format!("timeout: {timeout:?}"),
        }
    }

    /// Whether submitting the same request again could succeed.
    ///
    /// Only execution failures and caller-side timeouts are worth retrying; a closed or
    /// cancelled processor will not accept the request again, and an invariant violation
    /// is a handler bug.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RequestError::Execution { .. } | RequestError::Timeout { .. }
        )
    }
}

impl From<HandlerError> for RequestError {
    fn from(err: HandlerError) -> Self {
        RequestError::Execution {
            error: err.as_message(),
        }
    }
}

/// # Errors produced by batch handlers.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Processing of the whole batch failed.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl HandlerError {
    /// Builds a [`HandlerError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use batchvisor::HandlerError;
    ///
    /// let err = HandlerError::fail("out of memory");
    /// assert_eq!(err.as_label(), "handler_failed");
    /// assert_eq!(err.as_message(), "out of memory");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        HandlerError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
        }
    }

    /// Returns the underlying message.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Fail { error } => error.clone(),
        }
    }
}

/// # Errors produced by the processor lifecycle.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// `start()` was called on a processor whose control loop is already running.
    #[error("processor already started")]
    AlreadyStarted,

    /// `start()` was called after `cancel()`.
    #[error("processor closed")]
    Closed,

    /// Shutdown grace period was exceeded; some batches were still executing.
    #[error("shutdown timeout {grace:?} exceeded; in-flight batches: {in_flight:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Ids of the batches that had not completed in time.
        in_flight: Vec<u64>,
    },

    /// Registering OS signal listeners failed.
    #[error("signal handling failed: {error}")]
    Signal {
        /// The underlying I/O error message.
        error: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use batchvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), in_flight: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::AlreadyStarted => "runtime_already_started",
            RuntimeError::Closed => "runtime_closed",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Signal { .. } => "runtime_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::AlreadyStarted => "already started".to_string(),
            RuntimeError::Closed => "closed".to_string(),
            RuntimeError::GraceExceeded { grace, in_flight } => {
                format!("grace exceeded after {grace:?}; in-flight batches={in_flight:?}")
            }
            RuntimeError::Signal { error } => format!("signal: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_error_becomes_execution_error() {
        let err: RequestError = HandlerError::fail("gpu lost").into();
        assert_eq!(
            err,
            RequestError::Execution {
                error: "gpu lost".into()
            }
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn closed_and_canceled_are_not_retryable() {
        assert!(!RequestError::Closed.is_retryable());
        assert!(!RequestError::Canceled.is_retryable());
        assert!(
            !RequestError::Invariant {
                reason: "x".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn display_includes_details() {
        let err = RequestError::Invariant {
            reason: "expected 2 results, got 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "handler contract violated: expected 2 results, got 1"
        );
        assert_eq!(err.as_label(), "request_invariant_violated");
    }
}
