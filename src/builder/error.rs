//! Configuration errors raised while building a machine.

use crate::core::{EventId, StateId};
use thiserror::Error;

/// Errors that can occur when configuring a state machine.
///
/// All of these are raised synchronously to the configuring thread and leave
/// the machine as it was before the failing call.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("State duplicate, machine: {machine}, stateId: {state}")]
    DuplicateState { machine: String, state: StateId },

    #[error("State not found, machine: {machine}, stateId: {state}")]
    StateNotFound { machine: String, state: StateId },

    #[error("{state} transition duplicate, eventId: {event}, targetStateId: {target}")]
    DuplicateTransition {
        state: String,
        event: EventId,
        target: StateId,
    },

    #[error("{state} timeout transition duplicate, targetStateId: {target}")]
    DuplicateTimeoutTransition { state: String, target: StateId },

    #[error("{state} already has an enter action")]
    EnterActionAlreadySet { state: String },

    #[error("{state} already has an exit action")]
    ExitActionAlreadySet { state: String },

    #[error("{state} already has an auto-timer")]
    AutoTimerAlreadySet { state: String },

    #[error("Invalid machine configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
