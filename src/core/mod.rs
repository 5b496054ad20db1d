//! Core state machine types.
//!
//! This module contains the passive building blocks of a machine:
//! - States and their assign-once actions via [`State`]
//! - Per-state transition tables keyed by [`Trigger`]
//! - Bounded transit history
//!
//! Nothing here schedules work; execution lives in [`crate::machine`].

mod history;
mod state;
mod transition;

use crate::diagnostics::ActionError;
use std::sync::Arc;

pub use history::{TransitHistory, TransitRecord};
pub use state::State;
pub use transition::{Transition, TransitionTable, Trigger};

/// Identifier of a state, unique within its machine.
pub type StateId = i64;

/// Identifier of an event posted to a machine.
pub type EventId = i64;

/// Zero-argument enter/exit action.
pub type Action = Arc<dyn Fn() -> Result<(), ActionError> + Send + Sync>;

/// Wrap a closure as an [`Action`].
pub fn action<F>(f: F) -> Action
where
    F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
{
    Arc::new(f)
}
