//! Worker pool for process-isolated job execution
//!
//! This module provides:
//! - [`WorkerPool`] - Fixed set of worker threads draining one task queue
//! - [`WorkerPoolConfig`] - Worker count and thread naming configuration
//! - [`WorkerHandle`] - Join handle for a single worker thread
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        WorkerPool                            │
//! │                                                              │
//! │   TaskQueue (FIFO + completion barrier)                      │
//! │       │                                                      │
//! │       ▼ pop                                                  │
//! │  ┌──────────┐  ┌──────────┐       ┌──────────┐               │
//! │  │ Worker 0 │  │ Worker 1 │  ...  │ Worker N │  (threads)    │
//! │  └────┬─────┘  └────┬─────┘       └────┬─────┘               │
//! │       │ fork        │ fork             │ fork                │
//! │       ▼             ▼                  ▼                     │
//! │   [child 0]     [child 1]          [child N]  (one per job)  │
//! │       │             │                  │                     │
//! │       └──── outcome pipe ──────────────┘                     │
//! │                     │                                        │
//! │                     ▼                                        │
//! │              ResultSlots[index]                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each worker blocks on the queue, runs one job at a time in a forked child,
//! records the outcome in the job's slot, and keeps going until it pops a
//! [`Task::Stop`](crate::job::Task::Stop) marker.

mod dispatch;
mod pool;

pub use pool::{
    resolve_worker_count, PoolError, WorkerHandle, WorkerPool, WorkerPoolConfig,
};
