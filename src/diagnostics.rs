//! Diagnostic sinks and the action-catching shim.
//!
//! Every machine owns a reference to a [`DiagnosticSink`]. Nothing in this
//! crate writes to a process-wide trace manager; the default sink simply
//! forwards to the `tracing` facade, and callers that want to inspect
//! diagnostics can inject a [`MemorySink`] instead.

use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// Failure raised by a user-supplied enter or exit action.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    /// The action returned an error.
    #[error("Action failed: {0}")]
    Failed(String),

    /// The action panicked; the payload message is preserved when available.
    #[error("Action panicked: {0}")]
    Panicked(String),
}

impl ActionError {
    /// Convenience constructor for action bodies.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Fire-and-forget diagnostic output.
///
/// Implementations must never panic; the engine calls them from inside its
/// task execution path.
pub trait DiagnosticSink: Send + Sync {
    fn warning(&self, machine: &str, message: &str);

    fn debug(&self, machine: &str, message: &str);
}

/// Default sink: forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warning(&self, machine: &str, message: &str) {
        tracing::warn!(machine = machine, "{}", message);
    }

    fn debug(&self, machine: &str, message: &str) {
        tracing::debug!(machine = machine, "{}", message);
    }
}

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Debug,
}

/// A diagnostic captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub machine: String,
    pub message: String,
}

/// Sink that keeps every diagnostic in memory.
///
/// Cloning shares the underlying buffer, so a clone can be handed to the
/// machine while the original is kept for inspection.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded diagnostics, oldest first.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.with_severity(Severity::Warning)
    }

    pub fn debugs(&self) -> Vec<Diagnostic> {
        self.with_severity(Severity::Debug)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn with_severity(&self, severity: Severity) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .iter()
            .filter(|d| d.severity == severity)
            .cloned()
            .collect()
    }

    fn push(&self, severity: Severity, machine: &str, message: &str) {
        self.entries.lock().push(Diagnostic {
            severity,
            machine: machine.to_string(),
            message: message.to_string(),
        });
    }
}

impl DiagnosticSink for MemorySink {
    fn warning(&self, machine: &str, message: &str) {
        self.push(Severity::Warning, machine, message);
    }

    fn debug(&self, machine: &str, message: &str) {
        self.push(Severity::Debug, machine, message);
    }
}

/// Run `action`, converting both `Err` returns and panics into an
/// [`ActionError`]. Nothing escapes.
pub fn catch_action<F>(action: F) -> Result<(), ActionError>
where
    F: FnOnce() -> Result<(), ActionError>,
{
    match panic::catch_unwind(AssertUnwindSafe(action)) {
        Ok(result) => result,
        Err(payload) => Err(ActionError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
