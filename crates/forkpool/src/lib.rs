//! # Process-Isolated Job Pool
//!
//! A job-queue + worker-pool engine where every job function runs inside its
//! own forked child process.
//!
//! ## Features
//!
//! - **Unserialized inputs**: job arguments are ordinary closure captures —
//!   open handles, big buffers, anything — reaching the child through the
//!   forked address space. Only the job's *outcome* is ever serialized.
//! - **Fault containment**: a job that fails, panics, or kills its child
//!   process is recorded as a structured [`Failure`] in its result slot;
//!   the worker and every sibling job carry on.
//! - **Completion barrier**: [`JobQueue::join`] releases once every pushed
//!   item has been popped *and* explicitly acknowledged.
//! - **CPU-relative sizing**: ask for an exact worker count, all logical
//!   CPUs, or "all CPUs minus n".
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Submitter                            │
//! │  (pre-allocates ResultSlots, pushes jobs + stop markers)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  TaskQueue (JobQueue<Task>)                 │
//! │  (FIFO, blocking pop, task_done/join completion barrier)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        WorkerPool                           │
//! │  (worker threads; each forks one child per job and writes   │
//! │   the child's outcome into ResultSlots[index])              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use forkpool::{Job, JobQueue, ResultSlots, WorkerPool, WorkerPoolConfig};
//!
//! # fn main() -> Result<(), forkpool::PoolError> {
//! let njobs = 8;
//! let queue = Arc::new(JobQueue::new());
//! let slots = Arc::new(ResultSlots::new(njobs));
//!
//! let config = WorkerPoolConfig::new().with_workers(2);
//! let pool = WorkerPool::allocate(Arc::clone(&queue), config, ())?;
//!
//! for i in 0..njobs {
//!     pool.submit(Job::new(i, Arc::clone(&slots), move |_: &()| Ok((i + i) as u64)));
//! }
//! pool.shutdown()?;
//!
//! for i in 0..njobs {
//!     assert_eq!(slots.take(i), Some(Ok((2 * i) as u64)));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Isolation is built on `fork(2)`; the crate is Unix-only.

#[cfg(not(unix))]
compile_error!("forkpool requires a Unix platform: job isolation is built on fork(2)");

mod executor;

pub mod job;
pub mod outcome;
pub mod queue;
pub mod slots;
pub mod worker;

/// Prelude for common imports
pub mod prelude {
    pub use crate::job::{Job, JobFn, Task, TaskQueue};
    pub use crate::outcome::{Failure, JobError, JobResult};
    pub use crate::queue::JobQueue;
    pub use crate::slots::ResultSlots;
    pub use crate::worker::{PoolError, WorkerHandle, WorkerPool, WorkerPoolConfig};
}

// Re-export key types at crate root
pub use job::{Job, JobFn, Task, TaskQueue};
pub use outcome::{Failure, JobError, JobResult};
pub use queue::JobQueue;
pub use slots::ResultSlots;
pub use worker::{resolve_worker_count, PoolError, WorkerHandle, WorkerPool, WorkerPoolConfig};
