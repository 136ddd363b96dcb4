//! Event dispatch across the worker pool
//!
//! The scheduler's one promise: every index in
//! `[first_event, first_event + n_events)` is claimed by exactly one
//! worker, processed at most once, and never skipped. Claiming goes
//! through a shared atomic cursor, so partitioning adapts to uneven
//! event cost without any cross-worker coordination beyond the claim
//! itself.
//!
//! A worker drives each claimed event through Init -> Run -> Clear
//! with an exclusive [`EventScope`]. An `event_init` failure abandons
//! just that event; siblings are unaffected.

mod pilot;

pub(crate) use pilot::run_piloted;

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::Sender;
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::event::EventScope;
use crate::module::SimulationModule;
use crate::results::ResultRecord;

/// Shared claim cursor over a half-open event index range.
///
/// `claim` hands out each index exactly once. The compare-exchange
/// loop never advances past `end`, so the cursor cannot wrap even at
/// the top of the index space.
pub(crate) struct EventCursor {
    next: AtomicU64,
    end: u64,
}

impl EventCursor {
    pub(crate) fn new(range: Range<u64>) -> Self {
        Self {
            next: AtomicU64::new(range.start),
            end: range.end,
        }
    }

    /// Claim the next unprocessed event index, if any remain.
    pub(crate) fn claim(&self) -> Option<u64> {
        let mut current = self.next.load(Ordering::Relaxed);
        loop {
            if current >= self.end {
                return None;
            }
            match self.next.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Some(current),
                Err(observed) => current = observed,
            }
        }
    }
}

/// Aggregate outcome of a dispatch run, folded into the run summary.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DispatchStats {
    pub events_completed: u64,
    pub events_failed: u64,
    /// Events never attempted because their pilot's init failed
    pub events_skipped: u64,
    pub pilots_completed: u64,
    pub pilots_failed: u64,
}

/// What happened to a single claimed event.
enum EventOutcome {
    Completed,
    InitFailed,
}

/// Outcome counters for one batch of workers.
pub(crate) struct BatchStats {
    pub completed: u64,
    pub failed: u64,
}

/// Drive one event through its lifecycle on the calling worker.
///
/// The scope (and with it the event's RNG stream) exists before
/// `event_init` runs, because init is allowed to draw.
fn process_event<M: SimulationModule>(
    module: &M,
    sim: &M::SimContext,
    pilot: Option<&M::PilotContext>,
    event_index: u64,
    master_seed: u64,
    results: &Sender<ResultRecord>,
) -> EventOutcome {
    let mut scope = EventScope::new(event_index, master_seed, results);

    let mut event = match module.event_init(sim, pilot, &mut scope) {
        Ok(event) => event,
        Err(err) => {
            warn!(event = event_index, %err, "event init failed, skipping event");
            return EventOutcome::InitFailed;
        }
    };

    module.event_run(sim, pilot, &mut event, &mut scope);
    module.event_clear(sim, pilot, event, &mut scope);

    EventOutcome::Completed
}

/// Run `n_threads` workers until the given range is drained.
///
/// Blocks until every worker has gone idle. In pilot mode this is one
/// batch; in flat mode it is the whole run.
pub(crate) fn run_workers<M: SimulationModule>(
    module: &M,
    sim: &M::SimContext,
    pilot: Option<&M::PilotContext>,
    n_threads: usize,
    range: Range<u64>,
    master_seed: u64,
    results: &Sender<ResultRecord>,
) -> BatchStats {
    let cursor = EventCursor::new(range);
    let completed = AtomicU64::new(0);
    let failed = AtomicU64::new(0);

    std::thread::scope(|s| {
        for worker in 0..n_threads {
            let cursor = &cursor;
            let completed = &completed;
            let failed = &failed;

            s.spawn(move || {
                trace!(worker, "worker started");
                while let Some(event_index) = cursor.claim() {
                    match process_event(module, sim, pilot, event_index, master_seed, results) {
                        EventOutcome::Completed => completed.fetch_add(1, Ordering::Relaxed),
                        EventOutcome::InitFailed => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
                trace!(worker, "worker idle, range drained");
            });
        }
    });

    BatchStats {
        completed: completed.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
    }
}

/// Flat dispatch: all workers pull straight from the full event range.
pub(crate) fn run_flat<M: SimulationModule>(
    module: &M,
    sim: &M::SimContext,
    config: &EngineConfig,
    results: &Sender<ResultRecord>,
) -> DispatchStats {
    debug!(
        n_threads = config.n_threads,
        n_events = config.n_events,
        "flat dispatch started"
    );

    let batch = run_workers(
        module,
        sim,
        None,
        config.n_threads,
        config.event_range(),
        config.rng_seed,
        results,
    );

    DispatchStats {
        events_completed: batch.completed,
        events_failed: batch.failed,
        ..DispatchStats::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[test]
    fn test_cursor_hands_out_each_index_once() {
        let cursor = EventCursor::new(10..15);
        let claimed: Vec<u64> = std::iter::from_fn(|| cursor.claim()).collect();
        assert_eq!(claimed, vec![10, 11, 12, 13, 14]);
        assert_eq!(cursor.claim(), None);
    }

    #[test]
    fn test_cursor_empty_range() {
        let cursor = EventCursor::new(5..5);
        assert_eq!(cursor.claim(), None);
    }

    #[test]
    fn test_cursor_at_top_of_index_space() {
        // The claim loop must not wrap past end even when end == u64::MAX.
        let cursor = EventCursor::new(u64::MAX - 2..u64::MAX);
        assert_eq!(cursor.claim(), Some(u64::MAX - 2));
        assert_eq!(cursor.claim(), Some(u64::MAX - 1));
        assert_eq!(cursor.claim(), None);
        assert_eq!(cursor.claim(), None);
    }

    #[test]
    fn test_cursor_concurrent_claims_are_disjoint() {
        let cursor = EventCursor::new(0..10_000);
        let seen = Mutex::new(HashSet::new());

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let mut local = Vec::new();
                    while let Some(index) = cursor.claim() {
                        local.push(index);
                    }
                    let mut seen = seen.lock().unwrap();
                    for index in local {
                        assert!(seen.insert(index), "index {} claimed twice", index);
                    }
                });
            }
        });

        assert_eq!(seen.into_inner().unwrap().len(), 10_000);
    }
}
