//! # Example: graceful_flush
//!
//! Shutdown behavior with the built-in [`LogWriter`] attached.
//!
//! Shows how to:
//! - Attach subscribers with [`ProcessorBuilder::with_subscribers`](batchvisor::ProcessorBuilder::with_subscribers).
//! - Use [`ShutdownPolicy::Flush`] so queued requests still reach the handler on shutdown.
//! - Compare with [`ShutdownPolicy::Reject`], which cancels them instead.
//!
//! ## Flow
//! ```text
//! submit() ×3 (batch_size = 8, timeout = 10s: nothing would fire for a while)
//!   └─► shutdown()
//!         ├─ Flush  ─► final drain runs [a, b, c] ─► callers get results
//!         └─ Reject ─► [a, b, c] rejected with Canceled
//!   └─► submit() after shutdown ─► Closed
//! ```
//!
//! ## Run
//! Requires the `logging` feature to export [`LogWriter`].
//! ```bash
//! cargo run --example graceful_flush --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use batchvisor::{
    Config, HandlerError, HandlerFn, LogWriter, Processor, ShutdownPolicy, Subscribe,
};

async fn run(policy: ShutdownPolicy) -> anyhow::Result<()> {
    println!("--- shutdown policy: {policy:?} ---");
    let cfg = Config {
        batch_size: 8,
        timeout: Duration::from_secs(10),
        shutdown: policy,
        grace: Duration::from_secs(2),
        ..Config::default()
    };

    let upper = HandlerFn::arc("upper", |batch: Vec<&'static str>| async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<_, HandlerError>(batch.iter().map(|s| s.to_uppercase()).collect::<Vec<String>>())
    });

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let processor = Processor::builder(cfg)
        .with_name(format!("upper-{policy:?}").to_lowercase())
        .with_subscribers(subs)
        .build(upper);
    processor.start()?;

    let handles: Vec<_> = ["a", "b", "c"].into_iter().map(|s| processor.submit(s)).collect();
    tokio::time::sleep(Duration::from_millis(50)).await;
    processor.shutdown().await?;

    for res in futures::future::join_all(handles).await {
        println!("[caller] {res:?}");
    }
    println!("[caller] after shutdown: {:?}", processor.submit("d").await);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    run(ShutdownPolicy::Flush).await?;
    run(ShutdownPolicy::Reject).await?;
    Ok(())
}
