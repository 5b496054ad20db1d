//! Statechart: a finite state machine engine driven by a task poller
//!
//! Events are not processed on the calling thread. [`StateMachine::initiate`]
//! and [`StateMachine::post_event`] append a task to the machine's queue from
//! any thread; the owning application calls [`StateMachine::process`]
//! periodically, which drains the queue for a bounded time slice and runs
//! the enter/exit logic of every transition in submission order.
//!
//! # Core Concepts
//!
//! - **State**: integer id, optional enter/exit actions, optional auto-timer
//! - **Transition**: per-state mapping from event id to target state id
//! - **Task poller**: FIFO queue drained by a bounded-duration poll
//! - **Diagnostics**: injected [`DiagnosticSink`], `tracing` by default
//!
//! # Example
//!
//! ```rust
//! use statechart::StateMachine;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), statechart::BuildError> {
//! const OPEN: i64 = 1;
//! const CLOSED: i64 = 2;
//! const PUSH: i64 = 100;
//!
//! let openings = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&openings);
//!
//! let door = StateMachine::new("door");
//! door.add_state(CLOSED)?.transition(PUSH, OPEN)?;
//! door.add_state(OPEN)?
//!     .enter_action(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     })?
//!     .transition(PUSH, CLOSED)?;
//!
//! door.initiate(CLOSED)?;
//! door.post_event(PUSH);
//! door.process(Duration::from_millis(100));
//!
//! assert_eq!(door.current_state_id(), Some(OPEN));
//! assert_eq!(openings.load(Ordering::SeqCst), 1);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod diagnostics;
pub mod machine;
pub mod task;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder, MachineConfig};
pub use crate::core::{Action, EventId, StateId, TransitRecord, Trigger};
pub use diagnostics::{ActionError, DiagnosticSink, MemorySink, TracingSink};
pub use machine::{StateHandle, StateMachine};
pub use task::PollStats;
