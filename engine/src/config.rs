//! Engine configuration
//!
//! The host program (command-line parsing is its problem, not ours)
//! builds an [`EngineConfig`] and hands it to [`Engine::new`]. The
//! config pins down the event range, the worker pool size, the output
//! file, the master RNG seed, and the dispatch strategy.
//!
//! [`Engine::new`]: crate::engine::Engine::new

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

use crate::error::EngineError;

/// Default capacity of the result queue between workers and the I/O thread
fn default_queue_capacity() -> usize {
    1024
}

/// How the event range is handed to the worker pool
///
/// This is a runtime choice, not a build-time one: the same engine
/// binary serves modules that need pilot-scoped setup and modules that
/// do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DispatchMode {
    /// Every worker pulls straight from the full event range.
    #[default]
    Flat,

    /// Events are grouped into consecutive batches of `events_per_pilot`.
    /// Each batch is bracketed by one `pilot_init`/`pilot_clear` pair,
    /// and batches run strictly one at a time.
    Pilot {
        /// Number of events per pilot job (the last batch may be short)
        events_per_pilot: u64,
    },
}

/// Complete engine configuration
///
/// # Example
/// ```
/// use event_engine_core_rs::{DispatchMode, EngineConfig};
///
/// let config = EngineConfig {
///     n_threads: 4,
///     n_events: 100,
///     first_event: 0,
///     user_opts: String::new(),
///     output_file: "events.out".into(),
///     rng_seed: 12345,
///     dispatch: DispatchMode::Flat,
///     queue_capacity: 1024,
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of concurrent worker threads (at least 1)
    pub n_threads: usize,

    /// Total number of events to process
    pub n_events: u64,

    /// Index of the first event (events below it are skipped entirely)
    pub first_event: u64,

    /// Free-form option line forwarded verbatim to the module
    #[serde(default)]
    pub user_opts: String,

    /// File the I/O thread appends result records to (unless the module
    /// reduces them itself)
    pub output_file: PathBuf,

    /// Master seed from which every per-event stream is derived
    pub rng_seed: u64,

    /// Dispatch strategy (flat or pilot-batched)
    #[serde(default)]
    pub dispatch: DispatchMode,

    /// Bounded capacity of the result queue; a full queue blocks the
    /// enqueuing worker until the I/O thread catches up
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl EngineConfig {
    /// Parse a configuration from its JSON representation.
    ///
    /// Hosts that drive the engine from another language or from a
    /// config file hand over JSON; validation still happens separately
    /// in [`EngineConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidConfig(format!("JSON parsing failed: {}", e)))
    }

    /// Validate the configuration.
    ///
    /// # Returns
    /// * `Ok(())` - configuration is usable
    /// * `Err(EngineError::InvalidConfig)` - with the first violation found
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.n_threads == 0 {
            return Err(EngineError::InvalidConfig(
                "n_threads must be at least 1".to_string(),
            ));
        }

        if self.queue_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "queue_capacity must be at least 1".to_string(),
            ));
        }

        if self.first_event.checked_add(self.n_events).is_none() {
            return Err(EngineError::InvalidConfig(format!(
                "event range [{}, {} + {}) overflows",
                self.first_event, self.first_event, self.n_events
            )));
        }

        if let DispatchMode::Pilot { events_per_pilot } = self.dispatch {
            if events_per_pilot == 0 {
                return Err(EngineError::InvalidConfig(
                    "events_per_pilot must be at least 1".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// The half-open event index range `[first_event, first_event + n_events)`.
    pub fn event_range(&self) -> Range<u64> {
        self.first_event..self.first_event + self.n_events
    }

    /// Whether events are dispatched in pilot-bracketed batches.
    pub fn pilot_mode(&self) -> bool {
        matches!(self.dispatch, DispatchMode::Pilot { .. })
    }
}
