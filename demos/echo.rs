//! # Example: echo
//!
//! Minimal batching round trip with a closure handler.
//!
//! Shows how to:
//! - Wrap a closure with [`HandlerFn`].
//! - Submit from many concurrent callers and await each [`WaitHandle`](batchvisor::WaitHandle).
//! - Observe batch formation by size (full batches) and by timeout (the tail).
//!
//! ## Flow
//! ```text
//! 10 callers ──► submit() ──► AdmissionQueue
//!                               └─► Scheduler: [0..4) [4..8) by size, [8..10) after 50ms
//!                                     └─► echo handler ──► results back to each caller
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example echo
//! ```

use std::time::Duration;

use batchvisor::{Config, HandlerError, HandlerFn, Processor};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = Config {
        batch_size: 4,
        timeout: Duration::from_millis(50),
        ..Config::default()
    };

    let echo = HandlerFn::arc("echo", |batch: Vec<String>| async move {
        println!("[handler] batch of {}: {:?}", batch.len(), batch);
        Ok::<_, HandlerError>(batch.into_iter().map(|s| format!("echo: {s}")).collect::<Vec<String>>())
    });

    let processor = Processor::builder(cfg).build(echo);
    processor.start()?;

    let mut callers = tokio::task::JoinSet::new();
    for i in 0..10 {
        let p = processor.clone();
        callers.spawn(async move { (i, p.submit(format!("msg-{i}")).await) });
    }
    while let Some(joined) = callers.join_next().await {
        let (i, res) = joined?;
        println!("[caller {i}] {}", res?);
    }

    processor.shutdown().await?;
    Ok(())
}
