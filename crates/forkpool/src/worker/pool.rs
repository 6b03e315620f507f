//! Worker pool allocation and lifecycle.

use std::sync::Arc;
use std::thread::JoinHandle;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::dispatch::worker_loop;
use crate::job::{Job, Task, TaskQueue};

/// Worker pool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    /// Requested worker count.
    ///
    /// Positive values are used verbatim; `0` means one worker per logical
    /// CPU; a negative value reserves that many CPUs (all CPUs minus `|n|`,
    /// never below one worker).
    pub workers: isize,

    /// Prefix for worker thread names (`<prefix>-<id>`)
    pub thread_name_prefix: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            thread_name_prefix: "forkpool-worker".to_string(),
        }
    }
}

impl WorkerPoolConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requested worker count.
    pub fn with_workers(mut self, workers: isize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the worker thread name prefix.
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Worker count after applying the CPU-relative rules.
    pub fn resolved_workers(&self) -> usize {
        resolve_worker_count(self.workers)
    }
}

/// Resolve a requested worker count against the host's logical CPUs.
///
/// `0` resolves to all logical CPUs, a negative count reserves `|n|` CPUs
/// (clamped to at least one worker), and a positive count is used verbatim.
pub fn resolve_worker_count(requested: isize) -> usize {
    let available = std::thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(1);

    match requested {
        0 => available,
        n if n > 0 => n as usize,
        n => available.saturating_sub(n.unsigned_abs()).max(1),
    }
}

/// Worker pool errors
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The OS refused to start a worker thread; the pool cannot make
    /// progress and the fault surfaces directly from [`WorkerPool::allocate`].
    #[error("failed to launch worker thread: {0}")]
    Launch(#[from] std::io::Error),

    /// A worker thread itself panicked (detected when joining it).
    #[error("worker {id} panicked")]
    WorkerPanicked {
        /// Id of the dead worker
        id: usize,
    },
}

/// Handle to one running worker thread.
#[derive(Debug)]
pub struct WorkerHandle {
    id: usize,
    handle: JoinHandle<()>,
}

impl WorkerHandle {
    /// Worker id (position in the pool, `0..worker_count`).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the worker thread exits.
    ///
    /// Call only after the queue join has released; a worker that never
    /// received its stop marker blocks here forever (caller contract).
    pub fn join(self) -> Result<(), PoolError> {
        self.handle
            .join()
            .map_err(|_| PoolError::WorkerPanicked { id: self.id })
    }
}

/// Fixed set of worker threads bound to one task queue.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use forkpool::{Job, JobQueue, ResultSlots, WorkerPool, WorkerPoolConfig};
///
/// let queue = Arc::new(JobQueue::new());
/// let slots = Arc::new(ResultSlots::new(4));
/// let pool = WorkerPool::allocate(Arc::clone(&queue), WorkerPoolConfig::default(), ())?;
///
/// for i in 0..4_u64 {
///     pool.submit(Job::new(i as usize, Arc::clone(&slots), move |_: &()| Ok(i * i)));
/// }
/// pool.shutdown()?;
///
/// assert_eq!(slots.take(3), Some(Ok(9)));
/// # Ok::<(), forkpool::PoolError>(())
/// ```
pub struct WorkerPool<T, C> {
    queue: Arc<TaskQueue<T, C>>,
    workers: Vec<WorkerHandle>,
}

impl<T, C> WorkerPool<T, C>
where
    T: Serialize + DeserializeOwned + Send + 'static,
    C: Clone + Send + 'static,
{
    /// Spawn the configured number of workers against `queue`.
    ///
    /// Every worker is already running its dispatch loop when this returns.
    /// `context` is cloned into each worker and passed by reference to every
    /// job function — shared arguments reach jobs without ever being
    /// serialized.
    pub fn allocate(
        queue: Arc<TaskQueue<T, C>>,
        config: WorkerPoolConfig,
        context: C,
    ) -> Result<Self, PoolError> {
        let count = config.resolved_workers();
        info!(workers = count, "starting worker pool");

        let mut workers = Vec::with_capacity(count);
        for id in 0..count {
            let thread = std::thread::Builder::new()
                .name(format!("{}-{id}", config.thread_name_prefix))
                .spawn({
                    let queue = Arc::clone(&queue);
                    let context = context.clone();
                    move || worker_loop(id, queue, context)
                })?;
            workers.push(WorkerHandle { id, handle: thread });
        }

        Ok(Self { queue, workers })
    }

    /// Enqueue a job.
    pub fn submit(&self, job: Job<T, C>) {
        self.queue.push(Task::Run(job));
    }

    /// Number of workers in the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Handles of the running workers.
    pub fn workers(&self) -> &[WorkerHandle] {
        &self.workers
    }

    /// The queue this pool drains.
    pub fn queue(&self) -> &Arc<TaskQueue<T, C>> {
        &self.queue
    }

    /// Run the termination protocol: one stop marker per worker, wait for
    /// the queue barrier, then join every worker thread.
    pub fn shutdown(self) -> Result<(), PoolError> {
        for _ in 0..self.workers.len() {
            self.queue.push(Task::Stop);
        }
        self.queue.join();
        for worker in self.workers {
            worker.join()?;
        }
        Ok(())
    }

    /// Give up pool-managed shutdown and take the raw worker handles.
    ///
    /// For callers that drive the termination protocol by hand (push the
    /// stop markers, join the queue, then join each handle).
    pub fn into_workers(self) -> Vec<WorkerHandle> {
        self.workers
    }
}
