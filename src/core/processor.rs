//! # Processor: the facade callers interact with.
//!
//! A [`Processor`] owns the admission queue, the control loop and the handler. Callers
//! only ever see [`submit`](Processor::submit) and the returned [`WaitHandle`].
//!
//! ## Lifecycle
//! ```text
//!            start()               cancel()                 loop drained
//!   Init ───────────────► Running ───────────► Stopping ───────────────► Stopped
//!     │                                                                     ▲
//!     └──────────────────────────── cancel() ───────────────────────────────┘
//!
//! Init/Running : submit() queues the request
//! Stopping/Stopped : submit() returns a handle already rejected with Closed
//! ```
//!
//! ## Shutdown path
//! ```text
//! cancel():
//!   queue.close()  → admission closed (atomically with respect to submit)
//!   publish ShutdownRequested
//!   token.cancel() → control loop leaves its wait
//!   Reject: queued requests rejected here with Canceled → PendingRejected
//!
//! shutdown():
//!   cancel() ─► await control loop (bounded by Config::grace)
//!                 ├─ Ok      → AllStoppedWithin
//!                 └─ timeout → GraceExceeded (+ ids of batches still in flight)
//!             ─► stop subscriber listener (after the last event was forwarded)
//!   concurrent callers: wait for ctx.stopped (bounded by Config::grace)
//! ```
//!
//! ## Rules
//! - `cancel()` is idempotent, synchronous and callable from any context (also `Drop`).
//! - Batches already executing are never interrupted; their results are still delivered.
//! - Requests queued before `start()` are kept and batched once the loop runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio::{select, time::timeout};
use tokio_util::sync::CancellationToken;

use crate::core::builder::ProcessorBuilder;
use crate::core::context::Context;
use crate::core::executor::Executor;
use crate::core::lifecycle::Lifecycle;
use crate::core::queue::{self, AdmissionQueue};
use crate::core::scheduler::Scheduler;
use crate::core::{Config, shutdown};
use crate::error::{RequestError, RuntimeError};
use crate::events::{Event, EventKind};
use crate::handle::WaitHandle;
use crate::handlers::HandlerRef;
use crate::policies::ShutdownPolicy;
use crate::subscribers::{Subscribe, SubscriberSet};

#[derive(Default)]
struct Runtime {
    scheduler: Option<JoinHandle<()>>,
    listener: Option<JoinHandle<()>>,
}

/// Batches concurrent requests and dispatches them to a [`Handler`](crate::Handler).
///
/// Created with [`Processor::builder`]; shared between callers as `Arc<Processor<..>>`.
pub struct Processor<Req: Send + 'static, Resp: Send + 'static> {
    cfg: Config,
    name: Arc<str>,
    queue: Arc<AdmissionQueue<Req, Resp>>,
    ctx: Arc<Context>,
    handler: HandlerRef<Req, Resp>,
    token: CancellationToken,
    subscribers: Mutex<Vec<Arc<dyn Subscribe>>>,
    runtime: Mutex<Runtime>,
}

impl Processor<(), ()> {
    /// Returns a builder for a processor with the given configuration.
    ///
    /// The request and response types are taken from the handler passed to
    /// [`ProcessorBuilder::build`].
    pub fn builder(cfg: Config) -> ProcessorBuilder {
        ProcessorBuilder::new(cfg)
    }
}

impl<Req, Resp> Processor<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    pub(crate) fn new_internal(
        cfg: Config,
        handler: HandlerRef<Req, Resp>,
        ctx: Arc<Context>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        Self {
            cfg,
            name: Arc::clone(&ctx.name),
            queue: Arc::new(AdmissionQueue::new()),
            ctx,
            handler,
            token: CancellationToken::new(),
            subscribers: Mutex::new(subscribers),
            runtime: Mutex::new(Runtime::default()),
        }
    }

    /// Submits one request and returns its handle immediately.
    ///
    /// Never blocks. After `cancel()` the returned handle is already rejected with
    /// [`RequestError::Closed`].
    pub fn submit(&self, request: Req) -> WaitHandle<Resp> {
        match self.queue.enqueue(request) {
            Ok(handle) => handle,
            Err(err) => {
                self.ctx.publish(
                    Event::new(EventKind::RequestRejected).with_reason("closed"),
                );
                WaitHandle::rejected(err)
            }
        }
    }

    /// Starts the control loop (and the subscriber listener, if any).
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// - [`RuntimeError::AlreadyStarted`] if the loop is running
    /// - [`RuntimeError::Closed`] if the processor was cancelled
    pub fn start(&self) -> Result<(), RuntimeError> {
        self.queue.begin_run().map_err(|state| match state {
            Lifecycle::Running => RuntimeError::AlreadyStarted,
            _ => RuntimeError::Closed,
        })?;

        let subscribers = std::mem::take(&mut *lock(&self.subscribers));
        let set = SubscriberSet::for_processor(
            Arc::clone(&self.name),
            subscribers,
            self.ctx.bus.clone(),
        );
        let mut rt = lock(&self.runtime);
        if !set.is_empty() {
            rt.listener = Some(self.subscriber_listener(set));
        }

        let scheduler = Scheduler {
            queue: Arc::clone(&self.queue),
            executor: Executor::new(
                &self.cfg,
                Arc::clone(&self.handler),
                Arc::clone(&self.ctx),
            ),
            ctx: Arc::clone(&self.ctx),
            batch_size: self.cfg.batch_size_clamped(),
            timeout: self.cfg.timeout,
            policy: self.cfg.shutdown,
        };
        rt.scheduler = Some(tokio::spawn(scheduler.run(self.token.clone())));

        self.ctx.publish(
            Event::new(EventKind::ProcessorStarted)
                .with_size(self.cfg.batch_size_clamped())
                .with_reason(self.cfg.mode.as_label()),
        );
        Ok(())
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    ///
    /// Runs until `ctx.done` fires, then forwards what is still buffered and waits for
    /// the subscriber workers to finish.
    fn subscriber_listener(&self, set: SubscriberSet) -> JoinHandle<()> {
        let mut rx = self.ctx.bus.subscribe();
        let done = self.ctx.done.clone();

        tokio::spawn(async move {
            loop {
                select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    _ = done.cancelled() => {
                        loop {
                            match rx.try_recv() {
                                Ok(ev) => set.emit(&ev),
                                Err(TryRecvError::Lagged(_)) => continue,
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
            set.shutdown().await;
        })
    }

    /// Cancels, then waits for the control loop and in-flight batches.
    ///
    /// Waits at most [`Config::grace`]. Concurrent callers all wait for the same loop;
    /// only the first one publishes the closing event and stops the subscribers.
    /// Calling it again after the loop stopped returns immediately.
    ///
    /// # Errors
    /// [`RuntimeError::GraceExceeded`] with the ids of the batches still executing;
    /// they keep running in the background and still settle their requests.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.cancel();

        let (scheduler, listener) = {
            let mut rt = lock(&self.runtime);
            (rt.scheduler.take(), rt.listener.take())
        };

        let Some(handle) = scheduler else {
            // Another caller owns the loop handle (or it never ran): wait for the loop.
            return match timeout(self.cfg.grace, self.ctx.stopped.cancelled()).await {
                Ok(()) => Ok(()),
                Err(_) => Err(RuntimeError::GraceExceeded {
                    grace: self.cfg.grace,
                    in_flight: self.ctx.in_flight.snapshot(),
                }),
            };
        };

        let res = match timeout(self.cfg.grace, handle).await {
            Ok(_) => {
                self.ctx.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                let in_flight = self.ctx.in_flight.snapshot();
                self.ctx.publish(
                    Event::new(EventKind::GraceExceeded)
                        .with_size(in_flight.len())
                        .with_elapsed(self.cfg.grace),
                );
                Err(RuntimeError::GraceExceeded {
                    grace: self.cfg.grace,
                    in_flight,
                })
            }
        };

        self.ctx.done.cancel();
        if let Some(listener) = listener {
            let _ = listener.await;
        }
        res
    }

    /// Waits for an OS termination signal, then runs [`shutdown`](Self::shutdown).
    ///
    /// The processor must already be started.
    ///
    /// # Errors
    /// [`RuntimeError::Signal`] if the signal listeners could not be registered (the
    /// processor is shut down anyway), otherwise whatever `shutdown()` returns.
    pub async fn run_until_signal(&self) -> Result<(), RuntimeError> {
        let signal = shutdown::wait_for_shutdown_signal().await;
        let res = self.shutdown().await;
        signal.map_err(|e| RuntimeError::Signal {
            error: e.to_string(),
        })?;
        res
    }

    /// Closes admission and stops the control loop. Idempotent, never blocks.
    ///
    /// Under [`ShutdownPolicy::Reject`] every queued request is rejected with
    /// [`RequestError::Canceled`] before this returns. Under [`ShutdownPolicy::Flush`]
    /// the control loop still runs them. Batches already executing are never interrupted.
    pub fn cancel(&self) {
        let take_pending = matches!(self.cfg.shutdown, ShutdownPolicy::Reject);
        let Some((prev, pending)) = self.queue.close(take_pending) else {
            return;
        };

        self.ctx.publish(Event::new(EventKind::ShutdownRequested));
        self.token.cancel();

        let rejected = queue::reject_all(pending, RequestError::Canceled);
        if rejected > 0 {
            self.ctx.publish(
                Event::new(EventKind::PendingRejected)
                    .with_size(rejected)
                    .with_reason("canceled"),
            );
        }
        // Never started: no loop exists to announce the end.
        if prev == Lifecycle::Init {
            self.ctx.publish(Event::new(EventKind::ProcessorStopped));
            self.ctx.stopped.cancel();
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> Lifecycle {
        self.queue.state()
    }

    /// Number of requests queued and not yet part of a batch.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Ids of the batches currently executing, ascending.
    pub fn in_flight(&self) -> Vec<u64> {
        self.ctx.in_flight.snapshot()
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Name stamped on every event of this processor.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw access to the event stream.
    ///
    /// Receivers lagging more than `bus_capacity` events skip the oldest ones.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.ctx.bus.subscribe()
    }
}

impl<Req, Resp> Drop for Processor<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    fn drop(&mut self) {
        self.cancel();
        self.ctx.done.cancel();
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use crate::error::HandlerError;
    use crate::handlers::{Handler, HandlerFn};
    use crate::policies::ExecutionMode;

    type Calls = Arc<Mutex<Vec<(Vec<u32>, Instant)>>>;

    /// Multiplies every request by ten; fails batches containing `0`.
    fn times_ten(calls: Calls) -> Arc<impl Handler<Request = u32, Response = u32>> {
        HandlerFn::arc("times-ten", move |batch: Vec<u32>| {
            let calls = Arc::clone(&calls);
            async move {
                calls.lock().unwrap().push((batch.clone(), Instant::now()));
                if batch.contains(&0) {
                    return Err(HandlerError::fail("zero is not allowed"));
                }
                Ok(batch.into_iter().map(|x| x * 10).collect::<Vec<u32>>())
            }
        })
    }

    fn cfg(batch_size: usize, timeout: Duration) -> Config {
        Config {
            batch_size,
            timeout,
            ..Config::default()
        }
    }

    fn sizes(calls: &Calls) -> Vec<usize> {
        calls.lock().unwrap().iter().map(|(b, _)| b.len()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn back_to_back_requests_form_ceil_n_over_b_batches() {
        let calls: Calls = Arc::default();
        let p = Processor::builder(cfg(3, Duration::from_secs(60))).build(times_ten(Arc::clone(&calls)));
        p.start().unwrap();

        let handles: Vec<_> = (1..=10).map(|i| p.submit(i)).collect();
        for (h, i) in handles.into_iter().zip(1..=10u32) {
            assert_eq!(h.await, Ok(i * 10));
        }

        assert_eq!(sizes(&calls), vec![3, 3, 3, 1]);
        p.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn single_request_is_flushed_by_timeout() {
        let calls: Calls = Arc::default();
        let p = Processor::builder(cfg(2, Duration::from_millis(500))).build(times_ten(Arc::clone(&calls)));
        p.start().unwrap();

        let t0 = Instant::now();
        assert_eq!(p.submit(4).await, Ok(40));

        let recorded = calls.lock().unwrap().clone();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, vec![4]);
        let at = recorded[0].1 - t0;
        assert!(at >= Duration::from_millis(500) && at < Duration::from_millis(600));
        p.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn second_arrival_completes_batch_early() {
        let calls: Calls = Arc::default();
        let p = Processor::builder(cfg(2, Duration::from_millis(500))).build(times_ten(Arc::clone(&calls)));
        p.start().unwrap();

        let t0 = Instant::now();
        let a = p.submit(1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let b = p.submit(2);

        assert_eq!(a.await, Ok(10));
        assert_eq!(b.await, Ok(20));
        let recorded = calls.lock().unwrap().clone();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, vec![1, 2]);
        assert_eq!(recorded[0].1 - t0, Duration::from_millis(50));
        p.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_rejects_queued_request_without_invoking_handler() {
        let calls: Calls = Arc::default();
        let p = Processor::builder(cfg(2, Duration::from_millis(500))).build(times_ten(Arc::clone(&calls)));
        p.start().unwrap();

        let d = p.submit(7);
        p.cancel();
        assert_eq!(d.await, Err(RequestError::Canceled));

        p.shutdown().await.unwrap();
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(p.state(), Lifecycle::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_batch_does_not_affect_the_next_one() {
        let calls: Calls = Arc::default();
        let p = Processor::builder(cfg(2, Duration::from_secs(1))).build(times_ten(Arc::clone(&calls)));
        p.start().unwrap();

        let bad: Vec<_> = [0, 1].into_iter().map(|i| p.submit(i)).collect();
        let good: Vec<_> = [2, 3].into_iter().map(|i| p.submit(i)).collect();

        for h in bad {
            assert_eq!(
                h.await,
                Err(RequestError::Execution {
                    error: "zero is not allowed".into()
                })
            );
        }
        let good: Vec<_> = futures::future::join_all(good).await;
        assert_eq!(good, vec![Ok(20), Ok(30)]);
        p.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn parallel_mode_bounds_concurrent_batches() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (c, pk) = (Arc::clone(&current), Arc::clone(&peak));
        let slow = HandlerFn::arc("slow", move |batch: Vec<u32>| {
            let (c, pk) = (Arc::clone(&c), Arc::clone(&pk));
            async move {
                let now = c.fetch_add(1, Ordering::SeqCst) + 1;
                pk.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                c.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(batch)
            }
        });

        let mut config = cfg(1, Duration::from_millis(10));
        config.mode = ExecutionMode::parallel(2);
        let p = Processor::builder(config).build(slow);
        p.start().unwrap();

        let handles: Vec<_> = (0..6).map(|i| p.submit(i)).collect();
        let results = futures::future::join_all(handles).await;
        assert_eq!(results, (0..6).map(Ok::<u32, RequestError>).collect::<Vec<_>>());
        assert_eq!(peak.load(Ordering::SeqCst), 2);
        p.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn flush_policy_runs_queued_requests_on_shutdown() {
        let calls: Calls = Arc::default();
        let mut config = cfg(2, Duration::from_secs(10));
        config.shutdown = ShutdownPolicy::Flush;
        let p = Processor::builder(config).build(times_ten(Arc::clone(&calls)));
        p.start().unwrap();

        let h = p.submit(5);
        tokio::task::yield_now().await;
        p.shutdown().await.unwrap();

        assert_eq!(h.await, Ok(50));
        assert_eq!(sizes(&calls), vec![1]);
    }

    #[tokio::test]
    async fn submit_after_cancel_is_closed() {
        let p = Processor::builder(Config::default()).build(times_ten(Arc::default()));
        p.start().unwrap();
        let mut rx = p.subscribe();

        p.cancel();
        p.cancel();
        assert_eq!(p.submit(1).await, Err(RequestError::Closed));

        let mut saw_rejection = false;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::RequestRejected {
                assert_eq!(ev.reason.as_deref(), Some("closed"));
                saw_rejection = true;
            }
        }
        assert!(saw_rejection);
        p.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn start_is_only_allowed_once() {
        let p = Processor::builder(Config::default()).build(times_ten(Arc::default()));
        assert_eq!(p.state(), Lifecycle::Init);
        p.start().unwrap();
        assert_eq!(p.state(), Lifecycle::Running);
        assert!(matches!(p.start(), Err(RuntimeError::AlreadyStarted)));

        p.shutdown().await.unwrap();
        assert!(matches!(p.start(), Err(RuntimeError::Closed)));
    }

    #[tokio::test]
    async fn cancel_before_start_rejects_and_stops() {
        let p = Processor::builder(Config::default()).build(times_ten(Arc::default()));
        let early = p.submit(1);
        assert_eq!(p.pending(), 1);

        p.cancel();
        assert_eq!(early.await, Err(RequestError::Canceled));
        assert_eq!(p.state(), Lifecycle::Stopped);
        assert!(matches!(p.start(), Err(RuntimeError::Closed)));
        p.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn requests_queued_before_start_are_batched() {
        let calls: Calls = Arc::default();
        let p = Processor::builder(cfg(2, Duration::from_secs(1))).build(times_ten(Arc::clone(&calls)));
        let a = p.submit(1);
        let b = p.submit(2);
        p.start().unwrap();

        assert_eq!(a.await, Ok(10));
        assert_eq!(b.await, Ok(20));
        assert_eq!(sizes(&calls), vec![2]);
        p.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn grace_exceeded_reports_in_flight_batches() {
        let stuck = HandlerFn::arc("stuck", |batch: Vec<u32>| async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, HandlerError>(batch)
        });
        let config = Config {
            batch_size: 1,
            grace: Duration::from_secs(1),
            ..Config::default()
        };
        let p = Processor::builder(config).build(stuck);
        p.start().unwrap();

        let h = p.submit(9);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(p.in_flight(), vec![1]);

        match p.shutdown().await {
            Err(RuntimeError::GraceExceeded { grace, in_flight }) => {
                assert_eq!(grace, Duration::from_secs(1));
                assert_eq!(in_flight, vec![1]);
            }
            other => panic!("unexpected: {other:?}"),
        }
        // The batch keeps running and still delivers its result.
        assert_eq!(h.await, Ok(9));
    }

    #[tokio::test]
    async fn dropping_the_processor_cancels_pending_requests() {
        let p = Processor::builder(cfg(8, Duration::from_secs(60))).build(times_ten(Arc::default()));
        p.start().unwrap();
        let h = p.submit(1);
        drop(p);
        assert_eq!(h.await, Err(RequestError::Canceled));
    }

    /// Multiplies by ten; panics inside `handle` itself (before building a future)
    /// when the batch contains `0`.
    struct EagerTimesTen;

    impl Handler for EagerTimesTen {
        type Request = u32;
        type Response = u32;

        fn handle<'life0, 'async_trait>(
            &'life0 self,
            batch: Vec<u32>,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<u32>, HandlerError>> + Send + 'async_trait>>
        where
            'life0: 'async_trait,
            Self: 'async_trait,
        {
            if batch.contains(&0) {
                panic!("zero reached the device");
            }
            Box::pin(async move {
                Ok::<_, HandlerError>(batch.into_iter().map(|x| x * 10).collect::<Vec<u32>>())
            })
        }
    }

    #[tokio::test]
    async fn loop_survives_handler_panicking_before_its_future() {
        for mode in [ExecutionMode::Sequential, ExecutionMode::parallel(2)] {
            let config = Config {
                batch_size: 1,
                mode,
                shutdown: ShutdownPolicy::Flush,
                ..Config::default()
            };
            let p = Processor::builder(config).build(Arc::new(EagerTimesTen));
            p.start().unwrap();

            assert_eq!(
                p.submit(0).await,
                Err(RequestError::Execution {
                    error: "handler panicked: zero reached the device".into()
                })
            );
            assert_eq!(p.submit(1).await, Ok(10));
            assert!(p.in_flight().is_empty());
            assert_eq!(p.state(), Lifecycle::Running);

            p.shutdown().await.unwrap();
            assert_eq!(p.state(), Lifecycle::Stopped);
        }
    }

    struct Recorder {
        kinds: Mutex<Vec<EventKind>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Recorder {
                kinds: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            assert_eq!(event.processor.as_deref(), Some("scorer"));
            self.kinds.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn subscribers_see_the_whole_lifecycle() {
        let recorder = Recorder::new();
        let p = Processor::builder(cfg(1, Duration::from_secs(1)))
            .with_name("scorer")
            .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
            .build(times_ten(Arc::default()));
        assert_eq!(p.name(), "scorer");
        p.start().unwrap();

        assert_eq!(p.submit(3).await, Ok(30));
        p.shutdown().await.unwrap();

        let kinds = recorder.kinds.lock().unwrap().clone();
        assert_eq!(
            kinds,
            vec![
                EventKind::ProcessorStarted,
                EventKind::BatchFormed,
                EventKind::BatchStarting,
                EventKind::BatchCompleted,
                EventKind::ShutdownRequested,
                EventKind::ProcessorStopped,
                EventKind::AllStoppedWithin,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_shutdowns_both_wait_for_the_loop() {
        let slow = HandlerFn::arc("slow", |batch: Vec<u32>| async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, HandlerError>(batch)
        });
        let recorder = Recorder::new();
        let p = Processor::builder(cfg(1, Duration::from_secs(1)))
            .with_name("scorer")
            .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
            .build(slow);
        p.start().unwrap();

        let h = p.submit(4);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(p.in_flight(), vec![1]);

        let (first, second) = tokio::join!(p.shutdown(), p.shutdown());
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(p.state(), Lifecycle::Stopped);
        assert!(p.in_flight().is_empty());
        assert_eq!(h.await, Ok(4));

        let kinds = recorder.kinds.lock().unwrap().clone();
        assert!(kinds.contains(&EventKind::BatchCompleted));
        assert!(kinds.contains(&EventKind::ProcessorStopped));
        assert_eq!(kinds.last(), Some(&EventKind::AllStoppedWithin));

        // Once stopped, further calls return at once.
        p.shutdown().await.unwrap();
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, _event: &Event) {
            panic!("exporter offline");
        }

        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    #[tokio::test]
    async fn subscriber_panic_names_processor_and_subscriber() {
        let p = Processor::builder(cfg(1, Duration::from_secs(1)))
            .with_name("scorer")
            .with_subscribers(vec![Arc::new(Exploder) as Arc<dyn Subscribe>])
            .build(times_ten(Arc::default()));
        let mut rx = p.subscribe();
        p.start().unwrap();

        let panicked = timeout(Duration::from_secs(5), async {
            loop {
                let ev = rx.recv().await.unwrap();
                if ev.kind == EventKind::SubscriberPanicked {
                    return ev;
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(panicked.processor.as_deref(), Some("scorer"));
        assert_eq!(panicked.subscriber.as_deref(), Some("exploder"));
        assert_eq!(panicked.reason.as_deref(), Some("exporter offline"));
        p.shutdown().await.unwrap();
    }
}
