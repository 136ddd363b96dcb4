//! Engine lifecycle
//!
//! [`Engine::run`] drives a module through the fixed call sequence:
//!
//! ```text
//! simulation_init
//! run_init
//!     [ event dispatch: flat or pilot-batched,
//!       I/O thread draining the result queue alongside ]
//! run_clear
//! simulation_unload
//! ```
//!
//! Load-time failures (`simulation_init`, `run_init`) abort before any
//! event. Per-scope init failures are absorbed by the scheduler and
//! show up as counters in [`RunSummary`]; a run with a few failed
//! event inits completes with fewer results, not an error.

use crossbeam_channel::bounded;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{DispatchMode, EngineConfig};
use crate::error::EngineError;
use crate::module::{SimulationModule, SimulationSetup};
use crate::results::run_writer;
use crate::scheduler::{run_flat, run_piloted};

/// Outcome counters of a completed run
///
/// Serializable so hosts can log or persist it next to the output
/// file.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Identifier of this run (fresh per execution)
    pub run_id: Uuid,

    /// Events that went through the full Init/Run/Clear triad
    pub events_completed: u64,

    /// Events abandoned because their `event_init` failed
    pub events_failed: u64,

    /// Events never attempted because their pilot's init failed
    pub events_skipped: u64,

    /// Pilot jobs whose bracket completed (pilot mode only)
    pub pilots_completed: u64,

    /// Pilot jobs whose `pilot_init` failed (pilot mode only)
    pub pilots_failed: u64,

    /// Result records the engine appended to the output file
    pub results_written: u64,

    /// Result records consumed by the module's reducer hook
    pub results_reduced: u64,
}

/// The host-facing entry point: a module plus a validated config.
pub struct Engine<M: SimulationModule> {
    module: M,
    config: EngineConfig,
}

impl<M: SimulationModule> Engine<M> {
    /// Pair a module with a configuration.
    ///
    /// # Returns
    /// * `Err(EngineError::InvalidConfig)` - the config failed
    ///   [`EngineConfig::validate`]
    pub fn new(module: M, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { module, config })
    }

    /// The configuration this engine will run with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Execute the full simulation lifecycle.
    ///
    /// Blocks until the last event cleared, the result queue drained,
    /// and the module unloaded. An output-file error is reported only
    /// after `run_clear` and `simulation_unload` have still run.
    pub fn run(self) -> Result<RunSummary, EngineError> {
        let Engine { module, config } = self;
        let run_id = Uuid::new_v4();

        info!(
            %run_id,
            n_threads = config.n_threads,
            n_events = config.n_events,
            first_event = config.first_event,
            pilot_mode = config.pilot_mode(),
            "simulation run starting"
        );

        let setup = SimulationSetup {
            pilot_mode: config.pilot_mode(),
            n_threads: config.n_threads,
            n_events: config.n_events,
            first_event: config.first_event,
            user_opts: &config.user_opts,
        };

        let sim = module
            .simulation_init(&setup)
            .map_err(EngineError::SimulationInit)?;

        if let Err(err) = module.run_init(&sim) {
            warn!(%err, "run init failed, unloading without dispatch");
            module.simulation_unload(sim);
            return Err(EngineError::RunInit(err));
        }

        let (results_tx, results_rx) = bounded(config.queue_capacity);

        let (dispatch, writer) = std::thread::scope(|s| {
            let writer = s.spawn(|| run_writer(&module, &sim, &config.output_file, results_rx));

            let dispatch = match config.dispatch {
                DispatchMode::Flat => run_flat(&module, &sim, &config, &results_tx),
                DispatchMode::Pilot { events_per_pilot } => {
                    run_piloted(&module, &sim, &config, events_per_pilot, &results_tx)
                }
            };

            // Closing the producer side lets the writer finish draining.
            drop(results_tx);

            let writer = match writer.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            };
            (dispatch, writer)
        });

        module.run_clear(&sim);
        module.simulation_unload(sim);

        let writer = writer.map_err(EngineError::Io)?;

        let summary = RunSummary {
            run_id,
            events_completed: dispatch.events_completed,
            events_failed: dispatch.events_failed,
            events_skipped: dispatch.events_skipped,
            pilots_completed: dispatch.pilots_completed,
            pilots_failed: dispatch.pilots_failed,
            results_written: writer.written,
            results_reduced: writer.reduced,
        };

        info!(
            %run_id,
            events_completed = summary.events_completed,
            events_failed = summary.events_failed,
            results_written = summary.results_written,
            results_reduced = summary.results_reduced,
            "simulation run finished"
        );

        Ok(summary)
    }
}
