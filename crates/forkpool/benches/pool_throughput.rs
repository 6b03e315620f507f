//! Pool throughput benchmark: fork-per-job overhead on trivial jobs.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use forkpool::{Job, JobQueue, ResultSlots, WorkerPool, WorkerPoolConfig};

fn run_batch(njobs: usize, workers: isize) -> Arc<ResultSlots<u64>> {
    let queue = Arc::new(JobQueue::new());
    let slots = Arc::new(ResultSlots::new(njobs));
    let pool = WorkerPool::allocate(
        Arc::clone(&queue),
        WorkerPoolConfig::new().with_workers(workers),
        (),
    )
    .unwrap();

    for i in 0..njobs {
        pool.submit(Job::new(i, Arc::clone(&slots), move |_: &()| Ok(i as u64)));
    }
    pool.shutdown().unwrap();
    slots
}

fn bench_trivial_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_throughput");
    group.sample_size(10);

    group.bench_function("16_jobs_4_workers", |b| b.iter(|| run_batch(16, 4)));
    group.bench_function("64_jobs_8_workers", |b| b.iter(|| run_batch(64, 8)));

    group.finish();
}

criterion_group!(benches, bench_trivial_batches);
criterion_main!(benches);
