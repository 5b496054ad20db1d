//! Builder API for machine construction.
//!
//! [`MachineBuilder`] assembles a [`StateMachine`](crate::StateMachine) from a
//! [`MachineConfig`] and a diagnostic sink. States and transitions are then
//! added on the machine itself through
//! [`StateMachine::add_state`](crate::StateMachine::add_state).

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::{MachineBuilder, MachineConfig, DEFAULT_HISTORY_LIMIT, DEFAULT_SLICE_MS};
