//! Worker dispatch loop.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::executor::run_isolated;
use crate::job::{Task, TaskQueue};
use crate::outcome::{Failure, JobError};
use crate::queue::JobQueue;

/// Acknowledges one queue item on scope exit, so the completion barrier
/// advances even when dispatch unwinds.
struct DoneGuard<'a, I> {
    queue: &'a JobQueue<I>,
}

impl<I> Drop for DoneGuard<'_, I> {
    fn drop(&mut self) {
        self.queue.task_done();
    }
}

/// Body of one worker thread: pop, execute, record, repeat — until a stop
/// marker arrives.
///
/// A failed job is recorded and the loop continues; nothing a job does can
/// retire its worker. Exactly one `task_done` is issued per popped item.
pub(crate) fn worker_loop<T, C>(worker_id: usize, queue: Arc<TaskQueue<T, C>>, context: C)
where
    T: Serialize + DeserializeOwned,
{
    debug!(worker_id, "worker started");

    loop {
        let task = queue.pop();
        let _done = DoneGuard { queue: queue.as_ref() };

        match task {
            Task::Stop => {
                debug!(worker_id, "termination marker received");
                break;
            }
            Task::Run(job) => {
                let (index, func, slots) = job.into_parts();
                trace!(worker_id, index, "job dispatched");

                let result = catch_unwind(AssertUnwindSafe(|| run_isolated(func, &context)))
                    .unwrap_or_else(|payload| {
                        Err(Failure::Job {
                            error: JobError::from_panic(payload),
                        })
                    });

                if let Err(failure) = &result {
                    warn!(worker_id, index, error = %failure, "job failed");
                }
                slots.store(index, result);
            }
        }
    }

    debug!(worker_id, "worker stopped");
}
