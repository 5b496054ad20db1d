//! FIFO task queue drained by a bounded-duration poller.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Type alias for the deferred body of a task.
pub type TaskBody = Box<dyn FnOnce() + Send>;

/// A named unit of deferred work.
pub struct Task {
    id: Uuid,
    name: String,
    body: TaskBody,
}

impl Task {
    /// Wrap `body` as a task with a fresh id.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            body: Box::new(body),
        }
    }

    /// Unique id, used to correlate trace lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn run(self) {
        tracing::trace!(task_id = %self.id, task = %self.name, "running task");
        (self.body)();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Outcome of one drain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollStats {
    /// Tasks run during this drain
    pub executed: usize,
    /// Tasks still queued when the drain stopped
    pub remaining: usize,
    /// Wall-clock time spent draining
    pub elapsed: Duration,
}

/// Thread-safe task queue with a bounded drain.
///
/// `submit` may be called from any thread and only holds the queue lock long
/// enough to push. Drains are serialized: a second thread calling
/// [`poll_for`](Self::poll_for) waits until the first drain finishes, so two
/// tasks never run at the same time.
#[derive(Default)]
pub struct TaskPoller {
    queue: Mutex<VecDeque<Task>>,
    drain: Mutex<()>,
}

impl TaskPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `task` to the back of the queue without running it.
    pub fn submit(&self, task: Task) {
        self.queue.lock().push_back(task);
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Run queued tasks in submission order until the queue is empty or
    /// `budget` has elapsed.
    ///
    /// The budget is only checked between tasks. At least one task runs per
    /// call if any is queued, so a zero budget still makes progress.
    pub fn poll_for(&self, budget: Duration) -> PollStats {
        self.poll_for_with(budget, || {})
    }

    /// Like [`poll_for`](Self::poll_for), calling `before_each` before every
    /// dequeue. The hook may submit new tasks; they are eligible to run in
    /// the same drain.
    pub fn poll_for_with<F>(&self, budget: Duration, mut before_each: F) -> PollStats
    where
        F: FnMut(),
    {
        let _drain = self.drain.lock();
        let start = Instant::now();
        let mut executed = 0;

        loop {
            before_each();

            let Some(task) = self.queue.lock().pop_front() else {
                break;
            };
            task.run();
            executed += 1;

            if start.elapsed() >= budget {
                break;
            }
        }

        let elapsed = start.elapsed();
        if elapsed > budget {
            tracing::debug!(
                budget_us = u64::try_from(budget.as_micros()).unwrap_or(u64::MAX),
                elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
                executed = executed,
                "task slice overran its budget"
            );
        }

        PollStats {
            executed,
            remaining: self.len(),
            elapsed,
        }
    }
}

impl fmt::Debug for TaskPoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskPoller")
            .field("pending", &self.len())
            .finish()
    }
}
