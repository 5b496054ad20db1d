//! Auto-timer slot.
//!
//! A machine has at most one armed timer: the one belonging to the current
//! state. The slot is armed on state entry, disarmed on state exit, and
//! polled by the driver between tasks.

use crate::core::StateId;
use std::time::{Duration, Instant};

/// A timer armed by a state entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmedTimer {
    /// State whose entry armed the timer
    pub state: StateId,
    /// Transit number of that entry; a timeout is stale once the machine
    /// has transited past it
    pub transit: u64,
    pub deadline: Instant,
}

#[derive(Debug, Default)]
pub struct TimerSlot {
    armed: Option<ArmedTimer>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot, replacing any previously armed timer.
    pub fn arm(&mut self, state: StateId, transit: u64, duration: Duration, now: Instant) {
        self.armed = Some(ArmedTimer {
            state,
            transit,
            deadline: now + duration,
        });
    }

    pub fn cancel(&mut self) -> Option<ArmedTimer> {
        self.armed.take()
    }

    pub fn armed(&self) -> Option<ArmedTimer> {
        self.armed
    }

    /// Disarm and return the timer if its deadline has passed.
    pub fn take_expired(&mut self, now: Instant) -> Option<ArmedTimer> {
        match self.armed {
            Some(timer) if timer.deadline <= now => self.armed.take(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unarmed_slot_never_expires() {
        let mut slot = TimerSlot::new();
        assert!(slot.armed().is_none());
        assert!(slot.take_expired(Instant::now() + Duration::from_secs(3600)).is_none());
    }

    #[test]
    fn expires_only_after_deadline() {
        let now = Instant::now();
        let mut slot = TimerSlot::new();
        slot.arm(3, 7, Duration::from_millis(100), now);

        assert!(slot.take_expired(now + Duration::from_millis(50)).is_none());
        assert!(slot.armed().is_some());

        let fired = slot.take_expired(now + Duration::from_millis(100));
        assert_eq!(fired.map(|t| (t.state, t.transit)), Some((3, 7)));
        assert!(slot.armed().is_none());
    }

    #[test]
    fn cancel_disarms() {
        let now = Instant::now();
        let mut slot = TimerSlot::new();
        slot.arm(1, 1, Duration::ZERO, now);

        assert!(slot.cancel().is_some());
        assert!(slot.take_expired(now + Duration::from_secs(1)).is_none());
        assert!(slot.cancel().is_none());
    }

    #[test]
    fn arming_replaces_previous_timer() {
        let now = Instant::now();
        let mut slot = TimerSlot::new();
        slot.arm(1, 1, Duration::from_secs(10), now);
        slot.arm(2, 2, Duration::from_secs(20), now);

        assert_eq!(slot.armed().map(|t| t.state), Some(2));
    }
}
