//! # Processor lifecycle states.
//!
//! ```text
//! Init ──start()──► Running ──cancel()──► Stopping ──final drain + in-flight done──► Stopped
//!   │                                                                                  ▲
//!   └──────────────────────────────── cancel() ────────────────────────────────────────┘
//! ```
//!
//! Transitions only move forward; `Stopped` is terminal.

/// Lifecycle state of a [`Processor`](crate::Processor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lifecycle {
    /// Built but not started; submissions are queued.
    Init,
    /// Control loop running; submissions are accepted.
    Running,
    /// `cancel()` called; submissions are rejected, final drain in progress.
    Stopping,
    /// Control loop finished.
    Stopped,
}

impl Lifecycle {
    /// True while new submissions are accepted.
    #[inline]
    pub fn is_accepting(&self) -> bool {
        matches!(self, Lifecycle::Init | Lifecycle::Running)
    }

    /// Returns a short stable label for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Lifecycle::Init => "init",
            Lifecycle::Running => "running",
            Lifecycle::Stopping => "stopping",
            Lifecycle::Stopped => "stopped",
        }
    }
}
