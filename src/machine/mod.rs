//! The machine engine and its configuration handle.
//!
//! - [`StateMachine`]: registry, task queue, current state and the
//!   enter/exit/transition algorithm
//! - [`StateHandle`]: fluent per-state configuration
//!
//! Submission (`initiate`, `post_event`) is safe from any thread and never
//! waits. Execution happens only inside `process`, which runs at most one
//! task at a time per machine.

mod engine;
mod handle;
mod marker;

pub use engine::StateMachine;
pub use handle::StateHandle;
