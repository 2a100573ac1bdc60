//! # Example: parallel
//!
//! Bounded-parallel execution with a trait-based handler.
//!
//! Shows how to:
//! - Implement the [`Handler`] trait on a struct holding shared state.
//! - Run up to `P` batches concurrently with [`ExecutionMode::Parallel`].
//! - Read a failed batch's error on each of its callers.
//!
//! ## Flow
//! ```text
//! submit() ×24 ──► Scheduler (batch_size = 4)
//!                     └─► Executor::Parallel { workers: 3 }
//!                           ├─ slot 1 ─► Scorer::handle(batch)
//!                           ├─ slot 2 ─► Scorer::handle(batch)
//!                           └─ slot 3 ─► Scorer::handle(batch)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example parallel
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use batchvisor::{Config, ExecutionMode, Handler, HandlerError, Processor, RequestError};

/// Pretends to score text with a model; rejects batches containing an empty string.
struct Scorer {
    running: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl Handler for Scorer {
    type Request = String;
    type Response = f32;

    fn name(&self) -> &str {
        "scorer"
    }

    async fn handle(&self, batch: Vec<String>) -> Result<Vec<f32>, HandlerError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(200)).await;
        self.running.fetch_sub(1, Ordering::SeqCst);

        if batch.iter().any(String::is_empty) {
            return Err(HandlerError::fail("empty input in batch"));
        }
        Ok(batch.iter().map(|s| s.len() as f32 / 10.0).collect())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config {
        batch_size: 4,
        timeout: Duration::from_millis(20),
        mode: ExecutionMode::parallel(3),
        ..Config::default()
    };

    let scorer = Arc::new(Scorer {
        running: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let processor = Processor::builder(cfg).build(Arc::clone(&scorer));
    processor.start()?;

    let started = Instant::now();
    let handles: Vec<_> = (0..24)
        .map(|i| {
            let text = if i == 13 { String::new() } else { "x".repeat(i) };
            processor.submit(text)
        })
        .collect();

    for (i, res) in futures::future::join_all(handles).await.into_iter().enumerate() {
        match res {
            Ok(score) => println!("[caller {i:>2}] score={score:.1}"),
            Err(RequestError::Execution { error }) => println!("[caller {i:>2}] failed: {error}"),
            Err(e) => println!("[caller {i:>2}] {}", e.as_label()),
        }
    }

    println!(
        "6 batches in {:?}, peak concurrency {}",
        started.elapsed(),
        scorer.peak.load(Ordering::SeqCst)
    );
    processor.shutdown().await?;
    Ok(())
}
