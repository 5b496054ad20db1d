//! Deferred execution: the task queue/poller and the auto-timer slot.
//!
//! Producers [`submit`](TaskPoller::submit) named tasks from any thread. A
//! single driver drains them with [`poll_for`](TaskPoller::poll_for), which
//! runs tasks one at a time, in submission order, until the queue is empty or
//! the slice budget is used up.

mod poller;
mod timer;

pub use poller::{PollStats, Task, TaskBody, TaskPoller};
pub use timer::{ArmedTimer, TimerSlot};
