//! Parallel Event Engine Core
//!
//! Host engine for parallel discrete-event simulation. The engine
//! loads a user-supplied [`SimulationModule`], drives it through a
//! fixed lifecycle, fans independent events out across a pool of
//! worker threads (optionally grouped into sequential pilot jobs), and
//! funnels result records through a bounded queue to a single I/O
//! thread for persistence.
//!
//! # Architecture
//!
//! - **config**: run parameters and the dispatch mode
//! - **module**: the callback contract a simulation module implements
//! - **event**: per-event identity and execution scope
//! - **rng**: independent per-event random number streams
//! - **results**: result records, the bounded queue, the I/O thread
//! - **engine**: lifecycle orchestration and the run summary
//!
//! # Critical Invariants
//!
//! 1. Every event index in the configured range is processed exactly once
//! 2. An event's context and RNG stream are touched by exactly one thread
//! 3. Pilot setup/teardown never overlaps any other activity
//! 4. A result record always carries the identity of the event that queued it

// Module declarations
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod module;
pub mod results;
pub mod rng;

mod scheduler;

// Re-exports for convenience
pub use config::{DispatchMode, EngineConfig};
pub use engine::{Engine, RunSummary};
pub use error::{EngineError, ModuleError};
pub use event::{EventId, EventScope, ID_FIELD_SIZE};
pub use module::{SimulationModule, SimulationSetup};
pub use results::{ResultError, ResultRecord, RESULT_FIELD_SIZE};
pub use rng::RngStream;
