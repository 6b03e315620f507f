//! FIFO job queue with a completion barrier.
//!
//! [`JobQueue`] is the one structure multiple workers mutate concurrently.
//! Besides plain push/pop it tracks an *unfinished* count: every pushed item
//! must eventually be acknowledged with [`JobQueue::task_done`], and
//! [`JobQueue::join`] blocks until every pushed item has been. Popping an
//! item without marking it done leaves `join` blocked — that is the barrier
//! contract, not a bug.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

struct QueueState<I> {
    items: VecDeque<I>,
    /// Items pushed but not yet acknowledged via `task_done`.
    unfinished: usize,
}

/// Unbounded multi-producer multi-consumer FIFO queue with join semantics.
///
/// Producers never block. Consumers block in [`pop`](JobQueue::pop) until an
/// item arrives, process it, and then call [`task_done`](JobQueue::task_done)
/// exactly once per popped item.
pub struct JobQueue<I> {
    state: Mutex<QueueState<I>>,
    item_available: Condvar,
    all_done: Condvar,
}

impl<I> JobQueue<I> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                unfinished: 0,
            }),
            item_available: Condvar::new(),
            all_done: Condvar::new(),
        }
    }

    /// Enqueue an item. Never blocks.
    pub fn push(&self, item: I) {
        let mut state = self.state.lock();
        state.items.push_back(item);
        state.unfinished += 1;
        self.item_available.notify_one();
    }

    /// Dequeue the oldest item, blocking until one is available.
    pub fn pop(&self) -> I {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return item;
            }
            self.item_available.wait(&mut state);
        }
    }

    /// Acknowledge one previously popped item.
    ///
    /// # Panics
    ///
    /// Panics if called more times than items were pushed.
    pub fn task_done(&self) {
        let mut state = self.state.lock();
        if state.unfinished == 0 {
            panic!("task_done() called more times than items were pushed");
        }
        state.unfinished -= 1;
        if state.unfinished == 0 {
            self.all_done.notify_all();
        }
    }

    /// Block until every pushed item has been acknowledged.
    ///
    /// Returns immediately when nothing is outstanding.
    pub fn join(&self) {
        let mut state = self.state.lock();
        while state.unfinished > 0 {
            self.all_done.wait(&mut state);
        }
    }

    /// Number of items currently waiting in the queue.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Whether the queue currently holds no items.
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Number of pushed items not yet acknowledged.
    pub fn unfinished(&self) -> usize {
        self.state.lock().unfinished
    }
}

impl<I> Default for JobQueue<I> {
    fn default() -> Self {
        Self::new()
    }
}
