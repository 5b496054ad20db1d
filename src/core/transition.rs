//! Per-state transition tables.
//!
//! A transition table maps a [`Trigger`] to the id of the state the machine
//! moves to. Entries are insert-once: a second registration for the same
//! trigger is rejected and the first one stays in force.

use super::{EventId, StateId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// What causes a transition to be taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// An event posted through `StateMachine::post_event`.
    Event(EventId),

    /// The state's auto-timer expired while the state was still current.
    Timeout,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event(id) => write!(f, "event {}", id),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// Outgoing edge of a state.
///
/// The target is only an id; whether it names a registered state is checked
/// when the transition is traversed, which allows forward references while
/// the machine is being configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub target: StateId,
}

/// Mapping from trigger to outgoing transition.
#[derive(Clone, Debug, Default)]
pub struct TransitionTable {
    entries: HashMap<Trigger, Transition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a transition, returning the already-registered one if the
    /// trigger is taken. The table is left unchanged in that case.
    pub fn insert(&mut self, trigger: Trigger, target: StateId) -> Result<(), Transition> {
        match self.entries.get(&trigger) {
            Some(existing) => Err(*existing),
            None => {
                self.entries.insert(trigger, Transition { target });
                Ok(())
            }
        }
    }

    pub fn find(&self, trigger: Trigger) -> Option<Transition> {
        self.entries.get(&trigger).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every target id referenced by this table, in no particular order.
    pub fn targets(&self) -> impl Iterator<Item = StateId> + '_ {
        self.entries.values().map(|t| t.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_find() {
        let mut table = TransitionTable::new();
        assert!(table.is_empty());

        table.insert(Trigger::Event(10), 2).unwrap();
        table.insert(Trigger::Timeout, 3).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.find(Trigger::Event(10)), Some(Transition { target: 2 }));
        assert_eq!(table.find(Trigger::Timeout), Some(Transition { target: 3 }));
        assert_eq!(table.find(Trigger::Event(11)), None);
    }

    #[test]
    fn duplicate_trigger_keeps_first_entry() {
        let mut table = TransitionTable::new();
        table.insert(Trigger::Event(10), 2).unwrap();

        let rejected = table.insert(Trigger::Event(10), 5);

        assert_eq!(rejected, Err(Transition { target: 2 }));
        assert_eq!(table.find(Trigger::Event(10)), Some(Transition { target: 2 }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn event_and_timeout_do_not_collide() {
        let mut table = TransitionTable::new();
        table.insert(Trigger::Event(0), 1).unwrap();
        assert!(table.insert(Trigger::Timeout, 2).is_ok());
    }

    #[test]
    fn trigger_display() {
        assert_eq!(Trigger::Event(42).to_string(), "event 42");
        assert_eq!(Trigger::Timeout.to_string(), "timeout");
    }
}
