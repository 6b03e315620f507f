//! Ten doubling jobs across all CPUs, with one job fed a malformed argument.
//!
//! Run with: cargo run -p forkpool --example parallel_sums

use std::sync::Arc;

use forkpool::{Job, JobError, JobQueue, ResultSlots, WorkerPool, WorkerPoolConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<(), forkpool::PoolError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forkpool=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let njobs = 10;
    let queue = Arc::new(JobQueue::new());
    let slots = Arc::new(ResultSlots::new(njobs));

    // One worker per logical CPU.
    let pool = WorkerPool::allocate(Arc::clone(&queue), WorkerPoolConfig::default(), ())?;
    println!("workers: {}", pool.worker_count());

    for i in 0..njobs {
        // Job 8 gets a malformed argument and fails in its child. Just to test...
        let raw = if i == 8 {
            "eight".to_string()
        } else {
            i.to_string()
        };
        pool.submit(Job::new(i, Arc::clone(&slots), move |_: &()| {
            let value: u64 = raw
                .parse()
                .map_err(|e: std::num::ParseIntError| JobError::new("parse", e.to_string()))?;
            Ok(value + value)
        }));
    }

    println!("waiting");
    pool.shutdown()?;
    println!("workers stopped");

    let mut failures = 0;
    for i in 0..njobs {
        match slots.take(i) {
            Some(Ok(value)) => println!("job {i}: {value}"),
            Some(Err(failure)) => {
                failures += 1;
                println!("job {i}: FAILED ({failure})");
            }
            None => println!("job {i}: <never ran>"),
        }
    }

    assert_eq!(failures, 1, "only the poisoned job should fail");
    println!("seems to work well.");
    Ok(())
}
