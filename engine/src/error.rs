//! Engine and module error types
//!
//! Two layers of failure exist:
//! - `ModuleError`: reported by a simulation module's init hooks
//!   (`simulation_init`, `run_init`, `pilot_init`, `event_init`). The
//!   run-family hooks have no status channel and cannot fail.
//! - `EngineError`: raised by the engine itself (bad configuration,
//!   fatal load-time module failures, output I/O).

use thiserror::Error;

/// Failure reported by a simulation module's init hooks.
///
/// Replaces the `-1` status code of the original plugin contract: an
/// init hook either produces its context or explains why it could not.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ModuleError {
    message: String,
}

impl ModuleError {
    /// Create a module error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised by the engine
///
/// Only load-time module failures are fatal to a run. Per-event and
/// per-pilot init failures are swallowed by the scheduler and reported
/// through [`RunSummary`](crate::engine::RunSummary) counters instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration validation error
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// The module's `simulation_init` failed; nothing was run
    #[error("Simulation init failed: {0}")]
    SimulationInit(ModuleError),

    /// The module's `run_init` failed; the event loop never started
    /// and the simulation context was unloaded
    #[error("Run init failed: {0}")]
    RunInit(ModuleError),

    /// The result writer could not write the output file
    #[error("Output write failed: {0}")]
    Io(#[from] std::io::Error),
}
