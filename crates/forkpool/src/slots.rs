//! Caller-owned result container.
//!
//! The submitter pre-allocates one [`ResultSlots`] sized to the batch and
//! hands a shared reference to every job. Slot `i` is written exactly once,
//! by whichever worker executed job `i`; index ownership is disjoint by
//! construction, so a per-cell lock is all the synchronization the container
//! needs.

use parking_lot::Mutex;
use tracing::warn;

use crate::outcome::JobResult;

/// Fixed-length array of write-once result cells, indexed by job index.
pub struct ResultSlots<T> {
    cells: Vec<Mutex<Option<JobResult<T>>>>,
}

impl<T> ResultSlots<T> {
    /// Create a container with `len` empty slots.
    pub fn new(len: usize) -> Self {
        Self {
            cells: (0..len).map(|_| Mutex::new(None)).collect(),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the container has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether slot `index` has been written.
    pub fn is_set(&self, index: usize) -> bool {
        self.cells[index].lock().is_some()
    }

    /// Record the outcome for slot `index`.
    ///
    /// Each index must be used by at most one job per batch. A duplicate
    /// index is a submitter bug; the later write wins and is logged.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the container.
    pub(crate) fn store(&self, index: usize, result: JobResult<T>) {
        let mut cell = self.cells[index].lock();
        if cell.is_some() {
            warn!(index, "result slot written twice; duplicate job index in batch");
        }
        *cell = Some(result);
    }

    /// Copy the outcome out of slot `index`, if it has been written.
    pub fn get(&self, index: usize) -> Option<JobResult<T>>
    where
        T: Clone,
    {
        self.cells.get(index).and_then(|cell| cell.lock().clone())
    }

    /// Move the outcome out of slot `index`, leaving it empty.
    pub fn take(&self, index: usize) -> Option<JobResult<T>> {
        self.cells.get(index).and_then(|cell| cell.lock().take())
    }

    /// Indices that have not been written yet.
    ///
    /// After both the queue join and the worker joins this must be empty for
    /// a well-formed batch; anything listed here points at a job that was
    /// never submitted.
    pub fn missing(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.lock().is_none())
            .map(|(index, _)| index)
            .collect()
    }

    /// Consume the container, yielding every slot in index order.
    pub fn into_results(self) -> Vec<Option<JobResult<T>>> {
        self.cells
            .into_iter()
            .map(|cell| cell.into_inner())
            .collect()
    }
}
