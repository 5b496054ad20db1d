//! Machine configuration and the builder that applies it.

use crate::builder::error::BuildError;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::machine::StateMachine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default number of transit records kept per machine.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Default slice used by [`StateMachine::process_default`].
pub const DEFAULT_SLICE_MS: u64 = 10;

/// Serializable machine settings.
///
/// ```rust
/// use statechart::builder::MachineConfig;
///
/// let config = MachineConfig::from_json(r#"{ "name": "door", "history_limit": 8 }"#).unwrap();
/// assert_eq!(config.name, "door");
/// assert_eq!(config.history_limit, 8);
/// assert_eq!(config.default_slice_ms, 10);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Machine name, used only in diagnostics
    pub name: String,

    /// Maximum number of transit records kept; zero disables history
    pub history_limit: usize,

    /// Slice budget for `process_default`, in whole milliseconds
    pub default_slice_ms: u64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            name: "Unnamed".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_slice_ms: DEFAULT_SLICE_MS,
        }
    }
}

impl MachineConfig {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Slice budget used by [`StateMachine::process_default`].
    pub fn default_slice(&self) -> Duration {
        Duration::from_millis(self.default_slice_ms)
    }
}

/// Builder for constructing state machines with a fluent API.
pub struct MachineBuilder {
    config: MachineConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl MachineBuilder {
    /// Create a new builder with default settings and a [`TracingSink`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: MachineConfig {
                name: name.into(),
                ..MachineConfig::default()
            },
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace all settings, including the name.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Maximum number of transit records kept; zero disables history.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Slice budget for `process_default`.
    ///
    /// Stored with millisecond granularity: a sub-millisecond slice rounds
    /// down to zero, which still runs one task per `process_default` call.
    pub fn default_slice(mut self, slice: Duration) -> Self {
        self.config.default_slice_ms = u64::try_from(slice.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Route warnings and debug diagnostics to `sink`.
    pub fn sink<D>(mut self, sink: D) -> Self
    where
        D: DiagnosticSink + 'static,
    {
        self.sink = Arc::new(sink);
        self
    }

    /// Share an existing sink, e.g. one sink across several machines.
    pub fn shared_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Create the machine. It has no states yet.
    pub fn build(self) -> StateMachine {
        StateMachine::from_parts(self.config, self.sink)
    }
}
