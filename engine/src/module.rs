//! The simulation module contract
//!
//! A module is the user-supplied computational payload the engine
//! drives. It owns three nested context scopes, created and destroyed
//! by paired hooks:
//!
//! - simulation scope: `simulation_init` .. `simulation_unload`,
//!   exactly once per run, shared read-mostly with every thread;
//! - pilot scope (pilot mode only): `pilot_init` .. `pilot_clear`,
//!   once per pilot job, shared read-only with that batch's workers;
//! - event scope: `event_init` .. `event_clear`, once per event,
//!   exclusively owned by one worker.
//!
//! Ownership encodes the lifecycle: init hooks return their context by
//! value, clear/unload hooks consume it by value. The engine never
//! inspects a context and never locks around one; a module that
//! mutates its simulation context from event hooks must synchronize
//! that itself (interior mutability).
//!
//! Init hooks can fail; run/clear hooks cannot. A failed
//! `simulation_init` or `run_init` aborts the run before any event,
//! while a failed `pilot_init` or `event_init` only abandons that
//! scope and the run carries on.

use std::path::Path;

use crate::error::ModuleError;
use crate::event::{EventId, EventScope};

/// Run parameters handed to `simulation_init`
///
/// Mirrors what the engine was configured with, so the module can size
/// its own state. `pilot_mode` tells the module whether events will
/// arrive inside pilot brackets.
#[derive(Debug, Clone)]
pub struct SimulationSetup<'a> {
    /// Whether the run dispatches events in pilot-bracketed batches
    pub pilot_mode: bool,

    /// Number of concurrent worker threads
    pub n_threads: usize,

    /// Total number of events that will be processed
    pub n_events: u64,

    /// Index of the first event (earlier indices are skipped)
    pub first_event: u64,

    /// Free-form option line from the host, unparsed by the engine
    pub user_opts: &'a str,
}

/// The callback set a simulation module implements
///
/// Hooks with a default body are optional; the event triad and the two
/// context constructors are not. A module that never runs in pilot
/// mode can set `PilotContext = ()` and return `Ok(())` from
/// [`pilot_init`](SimulationModule::pilot_init); the hook is only
/// invoked under [`DispatchMode::Pilot`](crate::config::DispatchMode).
///
/// # Concurrency
///
/// | Hook | Calls | Runs on |
/// |---|---|---|
/// | `simulation_init`, `run_init` | once, before the loop | engine thread, alone |
/// | `pilot_init`, `pilot_clear` | once per pilot job | engine thread, no workers alive |
/// | `event_init`, `event_run`, `event_clear` | once per event | one worker, in parallel with other events |
/// | `reduce_result` | once per drained record | the I/O thread, never reentered |
/// | `run_clear`, `simulation_unload` | once, after the loop | engine thread, alone |
pub trait SimulationModule: Sync {
    /// Process-wide state, alive for the whole run.
    type SimContext: Sync;

    /// State shared by one pilot job's batch of events.
    type PilotContext: Sync;

    /// State private to a single event.
    type EventContext;

    /// Create the simulation context. Failure aborts the run before
    /// anything else happens.
    fn simulation_init(
        &self,
        setup: &SimulationSetup<'_>,
    ) -> Result<Self::SimContext, ModuleError>;

    /// Called once right before the event loop. Failure skips the loop
    /// entirely; the engine proceeds straight to `simulation_unload`.
    fn run_init(&self, sim: &Self::SimContext) -> Result<(), ModuleError> {
        let _ = sim;
        Ok(())
    }

    /// Create a pilot context. Runs with no concurrent activity, so
    /// keep it short. Failure skips that pilot's whole event batch.
    fn pilot_init(&self, sim: &Self::SimContext) -> Result<Self::PilotContext, ModuleError>;

    /// Create one event's context. May already draw from the scope's
    /// stream. Failure abandons the event: no run, no clear, no
    /// results.
    fn event_init(
        &self,
        sim: &Self::SimContext,
        pilot: Option<&Self::PilotContext>,
        scope: &mut EventScope<'_>,
    ) -> Result<Self::EventContext, ModuleError>;

    /// The worker routine. Cannot signal failure; anything that goes
    /// wrong here is the module's to handle internally.
    fn event_run(
        &self,
        sim: &Self::SimContext,
        pilot: Option<&Self::PilotContext>,
        event: &mut Self::EventContext,
        scope: &mut EventScope<'_>,
    );

    /// Tear down one event's context. Results may still be queued from
    /// here; after it returns the scope is gone.
    fn event_clear(
        &self,
        sim: &Self::SimContext,
        pilot: Option<&Self::PilotContext>,
        event: Self::EventContext,
        scope: &mut EventScope<'_>,
    ) {
        let _ = (sim, pilot, event, scope);
    }

    /// Tear down a pilot context after its batch's last event cleared.
    /// Runs with no concurrent activity.
    fn pilot_clear(&self, sim: &Self::SimContext, pilot: Self::PilotContext) {
        let _ = (sim, pilot);
    }

    /// Claim one drained result record instead of letting the engine
    /// write it.
    ///
    /// Return `true` to consume the record (the engine then writes
    /// nothing for it); the default declines everything, which routes
    /// all records to the output file. Runs on the I/O thread only and
    /// is never invoked twice concurrently.
    fn reduce_result(
        &self,
        sim: &Self::SimContext,
        output_file: &Path,
        id: &EventId,
        payload: &[u8],
    ) -> bool {
        let _ = (sim, output_file, id, payload);
        false
    }

    /// Called once after the last event cleared and the result queue
    /// drained.
    fn run_clear(&self, sim: &Self::SimContext) {
        let _ = sim;
    }

    /// Consume the simulation context. Last hook of the run.
    fn simulation_unload(&self, sim: Self::SimContext) {
        drop(sim);
    }
}
