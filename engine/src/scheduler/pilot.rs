//! Pilot-batched dispatch
//!
//! Pilot jobs run strictly one at a time. Each batch is bracketed by a
//! `pilot_init`/`pilot_clear` pair executed on the dispatcher thread
//! while no workers exist, so the module never observes two pilot
//! contexts alive at once and never sees pilot teardown overlap an
//! in-flight event.

use crossbeam_channel::Sender;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::module::SimulationModule;
use crate::results::ResultRecord;

use super::{run_workers, DispatchStats};

/// Dispatch the event range as consecutive pilot-bracketed batches.
///
/// A `pilot_init` failure skips that batch's events (counted as
/// skipped, not failed) and moves on to the next pilot.
pub(crate) fn run_piloted<M: SimulationModule>(
    module: &M,
    sim: &M::SimContext,
    config: &EngineConfig,
    events_per_pilot: u64,
    results: &Sender<ResultRecord>,
) -> DispatchStats {
    let range = config.event_range();
    let mut stats = DispatchStats::default();

    debug!(
        n_threads = config.n_threads,
        n_events = config.n_events,
        events_per_pilot,
        "pilot dispatch started"
    );

    let mut batch_start = range.start;
    let mut pilot_index = 0u64;

    while batch_start < range.end {
        let batch_end = batch_start
            .checked_add(events_per_pilot)
            .map_or(range.end, |end| end.min(range.end));

        let pilot = match module.pilot_init(sim) {
            Ok(pilot) => pilot,
            Err(err) => {
                warn!(pilot = pilot_index, %err, "pilot init failed, skipping batch");
                stats.pilots_failed += 1;
                stats.events_skipped += batch_end - batch_start;
                batch_start = batch_end;
                pilot_index += 1;
                continue;
            }
        };

        debug!(
            pilot = pilot_index,
            first = batch_start,
            count = batch_end - batch_start,
            "pilot batch started"
        );

        let batch = run_workers(
            module,
            sim,
            Some(&pilot),
            config.n_threads,
            batch_start..batch_end,
            config.rng_seed,
            results,
        );

        // All of the batch's workers are gone; teardown runs alone.
        module.pilot_clear(sim, pilot);

        stats.events_completed += batch.completed;
        stats.events_failed += batch.failed;
        stats.pilots_completed += 1;

        batch_start = batch_end;
        pilot_index += 1;
    }

    stats
}
