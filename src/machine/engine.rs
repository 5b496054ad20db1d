//! The state machine engine.
//!
//! [`StateMachine::initiate`] and [`StateMachine::post_event`] only enqueue a
//! task. State changes, enter/exit actions and timer handling all happen
//! inside [`StateMachine::process`], one task at a time, with the engine lock
//! held.

use crate::builder::{BuildError, MachineBuilder, MachineConfig};
use crate::core::{EventId, State, StateId, TransitHistory, TransitRecord, Trigger};
use crate::diagnostics::DiagnosticSink;
use crate::machine::handle::StateHandle;
use crate::machine::marker::ThreadMarker;
use crate::task::{PollStats, Task, TaskPoller, TimerSlot};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::ThreadId;
use std::time::{Duration, Instant};

/// Finite state machine whose events are serialized through a task queue.
///
/// The machine is a cheap, cloneable handle; clones share the same states,
/// queue and current state, so a clone can be moved to every producer
/// thread.
///
/// # Example
///
/// ```rust
/// use statechart::StateMachine;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), statechart::BuildError> {
/// let machine = StateMachine::new("door");
/// machine.add_state(1)?.transition(10, 2)?;
/// machine.add_state(2)?;
///
/// machine.initiate(1)?;
/// machine.process(Duration::from_millis(10));
/// assert_eq!(machine.current_state_id(), Some(1));
///
/// machine.post_event(10);
/// machine.process(Duration::from_millis(10));
/// assert_eq!(machine.current_state_id(), Some(2));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StateMachine {
    inner: Arc<Inner>,
}

struct Inner {
    config: MachineConfig,
    sink: Arc<dyn DiagnosticSink>,
    states: RwLock<HashMap<StateId, Arc<State>>>,
    poller: TaskPoller,
    /// Engine lock; held for the whole body of every task.
    runtime: Mutex<Runtime>,
    /// Best-effort copy of the current state id, readable without the
    /// engine lock.
    current_id: RwLock<Option<StateId>>,
    transit_count: AtomicU64,
    entered_at: Mutex<Option<Instant>>,
    history: Mutex<TransitHistory>,
    timer: Mutex<TimerSlot>,
    marker: ThreadMarker,
}

#[derive(Default)]
struct Runtime {
    current: Option<Arc<State>>,
}

impl StateMachine {
    /// Create a machine with default settings that reports through `tracing`.
    pub fn new(name: impl Into<String>) -> Self {
        MachineBuilder::new(name).build()
    }

    /// Start a [`MachineBuilder`] for a machine named `name`.
    pub fn builder(name: impl Into<String>) -> MachineBuilder {
        MachineBuilder::new(name)
    }

    pub(crate) fn from_parts(config: MachineConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        let history = TransitHistory::new(config.history_limit);
        Self {
            inner: Arc::new(Inner {
                config,
                sink,
                states: RwLock::new(HashMap::new()),
                poller: TaskPoller::new(),
                runtime: Mutex::new(Runtime::default()),
                current_id: RwLock::new(None),
                transit_count: AtomicU64::new(0),
                entered_at: Mutex::new(None),
                history: Mutex::new(history),
                timer: Mutex::new(TimerSlot::new()),
                marker: ThreadMarker::new(),
            }),
        }
    }

    /// Machine name, as used in diagnostics.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Settings the machine was built with.
    pub fn config(&self) -> &MachineConfig {
        &self.inner.config
    }

    // -- Configuration --------------------------------------------------------

    /// Register a new state and return a handle for configuring it.
    ///
    /// Meant for the setup phase, before the machine is driven.
    pub fn add_state(&self, id: StateId) -> Result<StateHandle, BuildError> {
        let mut states = self.inner.states.write();
        if states.contains_key(&id) {
            return Err(BuildError::DuplicateState {
                machine: self.name().to_string(),
                state: id,
            });
        }
        let state = Arc::new(State::new(id, self.name()));
        states.insert(id, Arc::clone(&state));
        Ok(StateHandle::new(state))
    }

    /// Handle for an already registered state.
    pub fn state(&self, id: StateId) -> Option<StateHandle> {
        self.inner.states.read().get(&id).cloned().map(StateHandle::new)
    }

    /// Whether `id` is registered.
    pub fn has_state(&self, id: StateId) -> bool {
        self.inner.states.read().contains_key(&id)
    }

    /// Registered state ids, ascending.
    pub fn state_ids(&self) -> Vec<StateId> {
        let mut ids: Vec<StateId> = self.inner.states.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    // -- Submission -----------------------------------------------------------

    /// Queue entry into `state_id`. Fails immediately if the state is not
    /// registered; otherwise returns without waiting for the entry to run.
    pub fn initiate(&self, state_id: StateId) -> Result<(), BuildError> {
        let state = self
            .inner
            .states
            .read()
            .get(&state_id)
            .cloned()
            .ok_or_else(|| BuildError::StateNotFound {
                machine: self.name().to_string(),
                state: state_id,
            })?;

        let weak = Arc::downgrade(&self.inner);
        self.inner.poller.submit(Task::new(
            format!("Machine[{}].ProcessInitiate[{}]", self.name(), state_id),
            move || {
                if let Some(inner) = weak.upgrade() {
                    inner.process_initiate(state);
                }
            },
        ));
        Ok(())
    }

    /// Queue delivery of `event`. Never blocks on execution.
    pub fn post_event(&self, event: EventId) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.poller.submit(Task::new(
            format!("Machine[{}].ProcessEvent[{}]", self.name(), event),
            move || {
                if let Some(inner) = weak.upgrade() {
                    inner.process_trigger(Trigger::Event(event), None);
                }
            },
        ));
    }

    // -- Execution ------------------------------------------------------------

    /// Drain queued tasks until the queue is empty or `slice` has elapsed.
    ///
    /// This is the only call that runs enter/exit actions. The budget is
    /// checked between tasks, so a slow action can overrun it. Expired
    /// auto-timers are turned into timeout tasks before each dequeue.
    ///
    /// Calling `process` from inside one of this machine's actions is
    /// refused with a warning instead of deadlocking.
    pub fn process(&self, slice: Duration) -> PollStats {
        if self.inner.marker.is_held_by_current_thread() {
            self.inner.sink.warning(
                self.name(),
                &format!(
                    "Machine[{}] process called from inside an action, ignored",
                    self.name()
                ),
            );
            return PollStats {
                executed: 0,
                remaining: self.inner.poller.len(),
                elapsed: Duration::ZERO,
            };
        }

        let inner = &self.inner;
        inner.poller.poll_for_with(slice, || inner.fire_expired_timer())
    }

    /// [`process`](Self::process) with the configured default slice.
    pub fn process_default(&self) -> PollStats {
        self.process(self.inner.config.default_slice())
    }

    // -- Introspection --------------------------------------------------------

    /// Id of the current state, `None` until the first initiation has been
    /// processed. A snapshot: it may be stale by the time it is read.
    pub fn current_state_id(&self) -> Option<StateId> {
        *self.inner.current_id.read()
    }

    /// Number of state entries so far.
    pub fn transit_count(&self) -> u64 {
        self.inner.transit_count.load(Ordering::SeqCst)
    }

    /// Number of queued tasks not yet run.
    pub fn pending_tasks(&self) -> usize {
        self.inner.poller.len()
    }

    /// Thread currently running one of this machine's tasks, if any.
    pub fn action_thread(&self) -> Option<ThreadId> {
        self.inner.marker.owner()
    }

    /// Time since the current state was entered.
    pub fn time_in_state(&self) -> Option<Duration> {
        self.inner.entered_at.lock().map(|at| at.elapsed())
    }

    /// Snapshot of the retained transit history.
    pub fn history(&self) -> TransitHistory {
        self.inner.history.lock().clone()
    }

    /// Deadline of the armed auto-timer, if one is armed and not yet fired.
    pub fn timer_deadline(&self) -> Option<Instant> {
        self.inner.timer.lock().armed().map(|t| t.deadline)
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("name", &self.name())
            .field("states", &self.inner.states.read().len())
            .field("current", &self.current_state_id())
            .field("transits", &self.transit_count())
            .field("pending", &self.pending_tasks())
            .finish()
    }
}

impl Inner {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn process_initiate(&self, state: Arc<State>) {
        let mut runtime = self.runtime.lock();
        let _marker = self.marker.enter();

        // Initiation is not a transit: the previous state, if any, is left
        // without running its exit action. Only its timer is disarmed.
        self.timer.lock().cancel();
        let from = runtime.current.as_ref().map(|current| current.id());
        self.set_current(&mut runtime, state);
        self.enter_state(&runtime, from, None);
    }

    /// `armed_at` is the transit number at which the timeout's timer was
    /// armed; the timeout is dropped if the machine has moved on since.
    fn process_trigger(&self, trigger: Trigger, armed_at: Option<u64>) {
        let mut runtime = self.runtime.lock();
        let _marker = self.marker.enter();

        let Some(current) = runtime.current.clone() else {
            self.sink.debug(
                self.name(),
                &format!("Machine[{}] discards {} before initiation", self.name(), trigger),
            );
            return;
        };

        if let Some(transit) = armed_at {
            if transit != self.transit_count.load(Ordering::SeqCst) {
                self.sink.debug(
                    self.name(),
                    &format!("{} discards stale {}", current.name(), trigger),
                );
                return;
            }
        }

        let Some(transition) = current.find_transition(trigger) else {
            self.sink.debug(
                self.name(),
                &format!("{} discards {}", current.name(), trigger),
            );
            return;
        };

        let target = self.states.read().get(&transition.target).cloned();
        let Some(target) = target else {
            panic!(
                "{} transition target not found on {}, targetStateId: {}",
                current.name(),
                trigger,
                transition.target
            );
        };

        self.do_transit(&mut runtime, target, trigger);
    }

    fn do_transit(&self, runtime: &mut Runtime, target: Arc<State>, trigger: Trigger) {
        let from = self.exit_state(runtime);

        // Transition-level actions would run here, between exit and enter.

        self.set_current(runtime, target);
        self.enter_state(runtime, from, Some(trigger));
    }

    fn set_current(&self, runtime: &mut Runtime, state: Arc<State>) {
        *self.current_id.write() = Some(state.id());
        runtime.current = Some(state);
    }

    fn enter_state(&self, runtime: &Runtime, from: Option<StateId>, trigger: Option<Trigger>) {
        let Some(current) = runtime.current.as_ref() else {
            return;
        };

        let transit = self.transit_count.fetch_add(1, Ordering::SeqCst) + 1;
        *self.entered_at.lock() = Some(Instant::now());
        self.history.lock().record(TransitRecord {
            transit,
            from,
            to: current.id(),
            trigger,
            entered_at: Utc::now(),
        });

        if let Some(Err(error)) = current.run_enter() {
            self.sink.warning(
                self.name(),
                &format!("{} enter action throws: {}", current.name(), error),
            );
        }

        let duration = current.auto_timer();
        if !duration.is_zero() {
            self.timer
                .lock()
                .arm(current.id(), transit, duration, Instant::now());
        }
    }

    /// Exit the current state, returning its id. The state's timer is
    /// disarmed before the exit action runs.
    fn exit_state(&self, runtime: &Runtime) -> Option<StateId> {
        let current = runtime.current.as_ref()?;

        self.timer.lock().cancel();

        if let Some(Err(error)) = current.run_exit() {
            self.sink.warning(
                self.name(),
                &format!("{} exit action throws: {}", current.name(), error),
            );
        }

        Some(current.id())
    }

    fn fire_expired_timer(self: &Arc<Self>) {
        let expired = self.timer.lock().take_expired(Instant::now());
        let Some(timer) = expired else {
            return;
        };

        let weak: Weak<Inner> = Arc::downgrade(self);
        self.poller.submit(Task::new(
            format!("Machine[{}].ProcessTimeout[{}]", self.name(), timer.state),
            move || {
                if let Some(inner) = weak.upgrade() {
                    inner.process_trigger(Trigger::Timeout, Some(timer.transit));
                }
            },
        ));
    }
}
