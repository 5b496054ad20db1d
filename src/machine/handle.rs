//! Fluent configuration handle for a registered state.

use crate::builder::BuildError;
use crate::core::{action, EventId, State, StateId, Trigger};
use crate::diagnostics::ActionError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Handle returned by [`StateMachine::add_state`](crate::StateMachine::add_state).
///
/// Every method returns `Result<&Self, BuildError>` so configuration can be
/// chained with `?`:
///
/// ```rust
/// use statechart::StateMachine;
///
/// # fn main() -> Result<(), statechart::BuildError> {
/// let machine = StateMachine::new("door");
/// machine
///     .add_state(1)?
///     .enter_action(|| Ok(()))?
///     .transition(10, 2)?
///     .transition(11, 3)?;
/// machine.add_state(2)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StateHandle {
    state: Arc<State>,
}

impl StateHandle {
    pub(crate) fn new(state: Arc<State>) -> Self {
        Self { state }
    }

    pub fn id(&self) -> StateId {
        self.state.id()
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    /// The underlying state, for inspection.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Attach the enter action. Fails if one is already attached; the first
    /// action stays in place.
    pub fn enter_action<F>(&self, f: F) -> Result<&Self, BuildError>
    where
        F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.state
            .set_enter_action(action(f))
            .map_err(|_| BuildError::EnterActionAlreadySet {
                state: self.name().to_string(),
            })?;
        Ok(self)
    }

    /// Attach the exit action. Fails if one is already attached.
    pub fn exit_action<F>(&self, f: F) -> Result<&Self, BuildError>
    where
        F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.state
            .set_exit_action(action(f))
            .map_err(|_| BuildError::ExitActionAlreadySet {
                state: self.name().to_string(),
            })?;
        Ok(self)
    }

    /// Register the transition taken when `event` is posted while this state
    /// is current. `target` does not have to exist yet.
    pub fn transition(&self, event: EventId, target: StateId) -> Result<&Self, BuildError> {
        self.state
            .insert_transition(Trigger::Event(event), target)
            .map_err(|_| BuildError::DuplicateTransition {
                state: self.name().to_string(),
                event,
                target,
            })?;
        Ok(self)
    }

    /// Arm a timer of `duration` every time this state is entered.
    /// `Duration::ZERO` leaves the timer disabled.
    pub fn auto_timer(&self, duration: Duration) -> Result<&Self, BuildError> {
        self.state
            .set_auto_timer(duration)
            .map_err(|_| BuildError::AutoTimerAlreadySet {
                state: self.name().to_string(),
            })?;
        Ok(self)
    }

    /// Register the transition taken when this state's auto-timer expires.
    pub fn on_timeout(&self, target: StateId) -> Result<&Self, BuildError> {
        self.state
            .insert_transition(Trigger::Timeout, target)
            .map_err(|_| BuildError::DuplicateTimeoutTransition {
                state: self.name().to_string(),
                target,
            })?;
        Ok(self)
    }
}

impl fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateHandle").field(&*self.state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transition;

    fn handle(id: StateId) -> StateHandle {
        StateHandle::new(Arc::new(State::new(id, "test")))
    }

    #[test]
    fn fluent_chain_configures_state() {
        let state = handle(1);
        state
            .enter_action(|| Ok(()))
            .and_then(|s| s.exit_action(|| Ok(())))
            .and_then(|s| s.transition(10, 2))
            .and_then(|s| s.auto_timer(Duration::from_millis(5)))
            .and_then(|s| s.on_timeout(3))
            .unwrap();

        let inner = state.state();
        assert!(inner.has_enter_action());
        assert!(inner.has_exit_action());
        assert_eq!(inner.auto_timer(), Duration::from_millis(5));
        assert_eq!(
            inner.find_transition(Trigger::Event(10)),
            Some(Transition { target: 2 })
        );
        assert_eq!(
            inner.find_transition(Trigger::Timeout),
            Some(Transition { target: 3 })
        );
    }

    #[test]
    fn second_enter_action_is_rejected() {
        let state = handle(1);
        state.enter_action(|| Ok(())).unwrap();

        let err = state.enter_action(|| Ok(())).unwrap_err();
        assert!(matches!(err, BuildError::EnterActionAlreadySet { .. }));
        assert_eq!(err.to_string(), "Machine[test].State[1] already has an enter action");
    }

    #[test]
    fn second_exit_action_is_rejected() {
        let state = handle(1);
        state.exit_action(|| Ok(())).unwrap();
        assert!(matches!(
            state.exit_action(|| Ok(())),
            Err(BuildError::ExitActionAlreadySet { .. })
        ));
    }

    #[test]
    fn duplicate_transition_keeps_first() {
        let state = handle(1);
        state.transition(10, 2).unwrap();

        let err = state.transition(10, 5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Machine[test].State[1] transition duplicate, eventId: 10, targetStateId: 5"
        );
        assert_eq!(
            state.state().find_transition(Trigger::Event(10)),
            Some(Transition { target: 2 })
        );
    }

    #[test]
    fn duplicate_timeout_and_timer_are_rejected() {
        let state = handle(1);
        state.on_timeout(2).unwrap();
        state.auto_timer(Duration::from_secs(1)).unwrap();

        assert!(matches!(
            state.on_timeout(3),
            Err(BuildError::DuplicateTimeoutTransition { target: 3, .. })
        ));
        assert!(matches!(
            state.auto_timer(Duration::from_secs(2)),
            Err(BuildError::AutoTimerAlreadySet { .. })
        ));
        assert_eq!(state.state().auto_timer(), Duration::from_secs(1));
    }
}
