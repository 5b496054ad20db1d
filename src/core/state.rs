//! States registered in a machine.
//!
//! A [`State`] carries its identity, optional enter/exit actions, an optional
//! auto-timer duration and its own transition table. Actions and the timer
//! are assign-once: a second assignment is refused so that configuration
//! mistakes surface instead of silently replacing earlier setup.

use super::transition::{Transition, TransitionTable, Trigger};
use super::{Action, StateId};
use crate::diagnostics::{catch_action, ActionError};
use parking_lot::RwLock;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// A state of a [`StateMachine`](crate::StateMachine).
///
/// States are created through
/// [`StateMachine::add_state`](crate::StateMachine::add_state) and configured
/// through the returned [`StateHandle`](crate::StateHandle).
pub struct State {
    id: StateId,
    name: String,
    enter_action: OnceLock<Action>,
    exit_action: OnceLock<Action>,
    auto_timer: OnceLock<Duration>,
    transitions: RwLock<TransitionTable>,
}

impl State {
    pub(crate) fn new(id: StateId, machine_name: &str) -> Self {
        Self {
            id,
            name: format!("Machine[{}].State[{}]", machine_name, id),
            enter_action: OnceLock::new(),
            exit_action: OnceLock::new(),
            auto_timer: OnceLock::new(),
            transitions: RwLock::new(TransitionTable::new()),
        }
    }

    /// Id the state was registered under.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Display name, `Machine[<machine>].State[<id>]`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an enter action is attached.
    pub fn has_enter_action(&self) -> bool {
        self.enter_action.get().is_some()
    }

    pub fn has_exit_action(&self) -> bool {
        self.exit_action.get().is_some()
    }

    /// Auto-timer duration. `Duration::ZERO` means the timer is disabled.
    pub fn auto_timer(&self) -> Duration {
        self.auto_timer.get().copied().unwrap_or(Duration::ZERO)
    }

    /// Transition taken on `trigger`, if one is configured.
    pub fn find_transition(&self, trigger: Trigger) -> Option<Transition> {
        self.transitions.read().find(trigger)
    }

    /// Number of configured transitions, timeout included.
    pub fn transition_count(&self) -> usize {
        self.transitions.read().len()
    }

    /// Target ids of every outgoing transition.
    pub fn transition_targets(&self) -> Vec<StateId> {
        self.transitions.read().targets().collect()
    }

    pub(crate) fn set_enter_action(&self, action: Action) -> Result<(), Action> {
        self.enter_action.set(action)
    }

    pub(crate) fn set_exit_action(&self, action: Action) -> Result<(), Action> {
        self.exit_action.set(action)
    }

    pub(crate) fn set_auto_timer(&self, duration: Duration) -> Result<(), Duration> {
        self.auto_timer.set(duration)
    }

    pub(crate) fn insert_transition(
        &self,
        trigger: Trigger,
        target: StateId,
    ) -> Result<(), Transition> {
        self.transitions.write().insert(trigger, target)
    }

    /// Run the enter action, if any. `None` when no action is attached.
    pub(crate) fn run_enter(&self) -> Option<Result<(), ActionError>> {
        self.enter_action.get().map(|action| catch_action(|| action()))
    }

    /// Run the exit action, if any. `None` when no action is attached.
    pub(crate) fn run_exit(&self) -> Option<Result<(), ActionError>> {
        self.exit_action.get().map(|action| catch_action(|| action()))
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enter_action", &self.has_enter_action())
            .field("exit_action", &self.has_exit_action())
            .field("auto_timer", &self.auto_timer())
            .field("transitions", &self.transition_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_action(counter: &Arc<AtomicUsize>) -> Action {
        let counter = Arc::clone(counter);
        action(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn state_name_includes_machine_and_id() {
        let state = State::new(7, "door");
        assert_eq!(state.id(), 7);
        assert_eq!(state.name(), "Machine[door].State[7]");
    }

    #[test]
    fn new_state_is_unconfigured() {
        let state = State::new(1, "m");
        assert!(!state.has_enter_action());
        assert!(!state.has_exit_action());
        assert_eq!(state.auto_timer(), Duration::ZERO);
        assert_eq!(state.transition_count(), 0);
        assert!(state.run_enter().is_none());
        assert!(state.run_exit().is_none());
    }

    #[test]
    fn enter_action_is_assign_once() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let state = State::new(1, "m");

        assert!(state.set_enter_action(counting_action(&first)).is_ok());
        assert!(state.set_enter_action(counting_action(&second)).is_err());

        assert_eq!(state.run_enter(), Some(Ok(())));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn exit_action_is_assign_once() {
        let first = Arc::new(AtomicUsize::new(0));
        let state = State::new(1, "m");

        assert!(state.set_exit_action(counting_action(&first)).is_ok());
        assert!(state.set_exit_action(counting_action(&first)).is_err());

        state.run_exit();
        assert_eq!(first.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_action_is_caught() {
        let state = State::new(1, "m");
        assert!(state
            .set_enter_action(action(|| Err(ActionError::failed("nope"))))
            .is_ok());
        assert!(state
            .set_exit_action(action(|| panic!("exit blew up")))
            .is_ok());

        assert!(matches!(state.run_enter(), Some(Err(ActionError::Failed(_)))));
        assert!(matches!(state.run_exit(), Some(Err(ActionError::Panicked(_)))));
    }

    #[test]
    fn auto_timer_is_assign_once() {
        let state = State::new(1, "m");
        assert!(state.set_auto_timer(Duration::from_millis(5)).is_ok());
        assert!(state.set_auto_timer(Duration::from_millis(9)).is_err());
        assert_eq!(state.auto_timer(), Duration::from_millis(5));
    }

    #[test]
    fn transitions_allow_forward_references() {
        let state = State::new(1, "m");
        state.insert_transition(Trigger::Event(10), 99).unwrap();
        assert_eq!(state.transition_targets(), vec![99]);
        assert_eq!(
            state.find_transition(Trigger::Event(10)),
            Some(Transition { target: 99 })
        );
    }
}
