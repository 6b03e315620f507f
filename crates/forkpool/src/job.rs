//! Job descriptors and queue elements.

use std::sync::Arc;

use crate::outcome::JobError;
use crate::queue::JobQueue;
use crate::slots::ResultSlots;

/// The function a job runs inside its child process.
///
/// The closure's captures are the job's arguments. They live in parent
/// memory and reach the child through the duplicated address space — nothing
/// about them is ever serialized, so open handles, large buffers and other
/// unserializable state are all fair game. The shared context `C` is the
/// pool-wide argument appended to every job.
pub type JobFn<T, C> = Box<dyn FnOnce(&C) -> Result<T, JobError> + Send + 'static>;

/// One unit of work: an index, a function, and where its outcome goes.
///
/// Created by the submitter, consumed exactly once by exactly one worker.
/// `index` must be unique within a batch and in range for the slot
/// container; reusing an index makes the later write win (and is logged as
/// a submitter bug).
pub struct Job<T, C> {
    index: usize,
    func: JobFn<T, C>,
    slots: Arc<ResultSlots<T>>,
}

impl<T, C> Job<T, C> {
    /// Create a job writing its outcome to `slots[index]`.
    pub fn new<F>(index: usize, slots: Arc<ResultSlots<T>>, func: F) -> Self
    where
        F: FnOnce(&C) -> Result<T, JobError> + Send + 'static,
    {
        Self {
            index,
            func: Box::new(func),
            slots,
        }
    }

    /// The slot index this job writes to.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Split the job into its parts for dispatch.
    pub(crate) fn into_parts(self) -> (usize, JobFn<T, C>, Arc<ResultSlots<T>>) {
        (self.index, self.func, self.slots)
    }
}

impl<T, C> std::fmt::Debug for Job<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job").field("index", &self.index).finish()
    }
}

/// Element of the queue workers drain.
#[derive(Debug)]
pub enum Task<T, C> {
    /// Execute this job, then keep dispatching
    Run(Job<T, C>),

    /// Termination marker: the worker that pops this stops.
    ///
    /// The submitter pushes exactly one `Stop` per worker after all real
    /// jobs; pushing fewer leaves workers blocked in `pop` forever.
    Stop,
}

/// Queue type shared between the submitter and a worker pool.
pub type TaskQueue<T, C> = JobQueue<Task<T, C>>;
