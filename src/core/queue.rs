//! # Admission queue: FIFO buffer between producers and the control loop.
//!
//! Producers append `(request, resolver, arrival)` entries with [`AdmissionQueue::enqueue`];
//! the control loop removes them from the head with [`AdmissionQueue::drain`].
//!
//! ## Architecture
//! ```text
//! submit() ─┐                                       ┌─► snapshot() → (len, oldest arrival)
//! submit() ─┼─► enqueue ─► Mutex<Inner> ─► notify ──┤
//! submit() ─┘      │        ├ entries: VecDeque      └─► drain(batch_size) → Batch
//!                  │        ├ state: Lifecycle
//!                  │        └ next_batch: u64
//!                  └─ state not accepting → Err(Closed)
//! ```
//!
//! ## Rules
//! - One mutex guards entries **and** lifecycle: an enqueue is either fully visible to a
//!   drain/close or not at all, and no entry slips in after `close()`.
//! - The oldest pending arrival is always the head entry's arrival.
//! - Batches are numbered per queue, starting at 1.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Notify, futures::Notified};
use tokio::time::Instant;

use crate::core::lifecycle::Lifecycle;
use crate::error::RequestError;
use crate::handle::{self, Resolver, WaitHandle};

/// One queued request.
pub(crate) struct Pending<Req, Resp> {
    pub request: Req,
    pub resolver: Resolver<Resp>,
    pub arrived: Instant,
}

/// An ordered, immutable group of requests drained together.
///
/// `1 ≤ len ≤ batch_size`, entries in admission order.
pub(crate) struct Batch<Req, Resp> {
    id: u64,
    entries: Vec<Pending<Req, Resp>>,
}

impl<Req, Resp> Batch<Req, Resp> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// How long the oldest request of the batch has been queued.
    pub fn oldest_wait(&self) -> Duration {
        self.entries
            .first()
            .map(|p| p.arrived.elapsed())
            .unwrap_or_default()
    }

    /// Splits the batch into positionally aligned requests and resolvers.
    pub fn into_parts(self) -> (Vec<Req>, Vec<Resolver<Resp>>) {
        self.entries
            .into_iter()
            .map(|p| (p.request, p.resolver))
            .unzip()
    }

    /// Rejects every request of the batch; returns how many were rejected.
    pub fn reject_all(self, err: RequestError) -> usize {
        reject_all(self.entries, err)
    }
}

/// Rejects every entry with a clone of `err`; returns how many were rejected.
pub(crate) fn reject_all<Req, Resp>(entries: Vec<Pending<Req, Resp>>, err: RequestError) -> usize {
    let n = entries.len();
    for p in entries {
        p.resolver.reject(err.clone());
    }
    n
}

struct Inner<Req, Resp> {
    entries: VecDeque<Pending<Req, Resp>>,
    state: Lifecycle,
    next_batch: u64,
}

/// Thread-safe FIFO of pending requests plus the processor lifecycle flag.
pub(crate) struct AdmissionQueue<Req, Resp> {
    inner: Mutex<Inner<Req, Resp>>,
    notify: Notify,
}

impl<Req, Resp> AdmissionQueue<Req, Resp> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: VecDeque::new(),
                state: Lifecycle::Init,
                next_batch: 1,
            }),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<Req, Resp>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a request and returns its handle without blocking.
    ///
    /// Fails with [`RequestError::Closed`] once the processor is stopping or stopped;
    /// the request is then dropped, not queued.
    pub fn enqueue(&self, request: Req) -> Result<WaitHandle<Resp>, RequestError> {
        let (resolver, handle) = handle::slot();
        {
            let mut inner = self.lock();
            if !inner.state.is_accepting() {
                return Err(RequestError::Closed);
            }
            inner.entries.push_back(Pending {
                request,
                resolver,
                arrived: Instant::now(),
            });
        }
        self.notify.notify_one();
        Ok(handle)
    }

    /// Atomically removes up to `max_items` entries from the head.
    ///
    /// Returns `None` when the queue is empty.
    pub fn drain(&self, max_items: usize) -> Option<Batch<Req, Resp>> {
        let mut inner = self.lock();
        if inner.entries.is_empty() {
            return None;
        }
        let take = max_items.max(1).min(inner.entries.len());
        let entries: Vec<_> = inner.entries.drain(..take).collect();
        let id = inner.next_batch;
        inner.next_batch += 1;
        Some(Batch { id, entries })
    }

    /// Removes every entry.
    pub fn drain_all(&self) -> Vec<Pending<Req, Resp>> {
        self.lock().entries.drain(..).collect()
    }

    /// Current length and arrival of the oldest entry.
    pub fn snapshot(&self) -> (usize, Option<Instant>) {
        let inner = self.lock();
        (inner.entries.len(), inner.entries.front().map(|p| p.arrived))
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn state(&self) -> Lifecycle {
        self.lock().state
    }

    /// Future completing on the next enqueue or close.
    ///
    /// Call `enable()` on it **before** taking a snapshot so no wakeup is lost.
    pub fn notified(&self) -> Notified<'_> {
        self.notify.notified()
    }

    /// `Init → Running`. Returns the current state if the transition is not allowed.
    pub fn begin_run(&self) -> Result<(), Lifecycle> {
        let mut inner = self.lock();
        match inner.state {
            Lifecycle::Init => {
                inner.state = Lifecycle::Running;
                Ok(())
            }
            other => Err(other),
        }
    }

    /// Closes admission.
    ///
    /// - `Init → Stopped`: nothing will ever drain the queue, so every entry is returned.
    /// - `Running → Stopping`: entries are returned only if `take_pending` is set.
    /// - Already closing: `None` (idempotent).
    ///
    /// Returns the previous state and the removed entries.
    pub fn close(&self, take_pending: bool) -> Option<(Lifecycle, Vec<Pending<Req, Resp>>)> {
        let closed = {
            let mut inner = self.lock();
            match inner.state {
                Lifecycle::Init => {
                    inner.state = Lifecycle::Stopped;
                    Some((Lifecycle::Init, inner.entries.drain(..).collect()))
                }
                Lifecycle::Running => {
                    inner.state = Lifecycle::Stopping;
                    let pending = if take_pending {
                        inner.entries.drain(..).collect()
                    } else {
                        Vec::new()
                    };
                    Some((Lifecycle::Running, pending))
                }
                Lifecycle::Stopping | Lifecycle::Stopped => None,
            }
        };
        if closed.is_some() {
            self.notify.notify_one();
        }
        closed
    }

    /// `Stopping → Stopped`.
    pub fn mark_stopped(&self) {
        self.lock().state = Lifecycle::Stopped;
    }
}
