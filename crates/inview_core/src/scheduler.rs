//! Next-turn task queue
//!
//! The host loop calls [`TaskQueue::run_pending`] once per turn. Work queued
//! with [`TaskQueue::defer`] therefore runs no earlier than the next turn,
//! which is what a zero-delay timer gives a browser page.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

type Task = Box<dyn FnOnce()>;

/// FIFO queue of deferred tasks
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<Task>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task for the next turn
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Run every task queued before this call
    ///
    /// Tasks deferred by the tasks being run wait for the following turn.
    /// Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let turn: Vec<Task> = self.tasks.borrow_mut().drain(..).collect();
        let count = turn.len();
        for task in turn {
            task();
        }
        if count > 0 {
            tracing::trace!(count, "ran deferred tasks");
        }
        count
    }

    /// Number of tasks waiting for the next turn
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.len())
            .finish()
    }
}
