//! Scheduler coverage tests
//!
//! The engine's core promise: every event index in
//! `[first_event, first_event + n_events)` is processed exactly once,
//! for any thread count. No index twice, no index skipped.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use event_engine_core_rs::{
    DispatchMode, Engine, EngineConfig, EventScope, ModuleError, SimulationModule, SimulationSetup,
};

use proptest::prelude::*;

/// Module that records every event index it is initialized with.
struct RecordingModule {
    seen: Arc<Mutex<Vec<u64>>>,
}

impl SimulationModule for RecordingModule {
    type SimContext = ();
    type PilotContext = ();
    type EventContext = ();

    fn simulation_init(&self, _setup: &SimulationSetup<'_>) -> Result<(), ModuleError> {
        Ok(())
    }

    fn pilot_init(&self, _sim: &()) -> Result<(), ModuleError> {
        Ok(())
    }

    fn event_init(
        &self,
        _sim: &(),
        _pilot: Option<&()>,
        scope: &mut EventScope<'_>,
    ) -> Result<(), ModuleError> {
        self.seen.lock().unwrap().push(scope.event_index());
        Ok(())
    }

    fn event_run(
        &self,
        _sim: &(),
        _pilot: Option<&()>,
        _event: &mut (),
        _scope: &mut EventScope<'_>,
    ) {
    }
}

fn config(n_threads: usize, n_events: u64, first_event: u64) -> EngineConfig {
    EngineConfig {
        n_threads,
        n_events,
        first_event,
        user_opts: String::new(),
        // No test here queues a result, so the file is never created.
        output_file: std::env::temp_dir().join("engine-coverage-unused.out"),
        rng_seed: 42,
        dispatch: DispatchMode::Flat,
        queue_capacity: 64,
    }
}

/// Run the engine and return the sorted list of processed indices.
fn processed_indices(n_threads: usize, n_events: u64, first_event: u64) -> Vec<u64> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let module = RecordingModule { seen: seen.clone() };

    let summary = Engine::new(module, config(n_threads, n_events, first_event))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(summary.events_completed, n_events);
    assert_eq!(summary.events_failed, 0);

    let mut indices = seen.lock().unwrap().clone();
    indices.sort_unstable();
    indices
}

#[test]
fn test_all_events_processed_exactly_once() {
    let indices = processed_indices(4, 100, 0);
    assert_eq!(indices, (0..100).collect::<Vec<u64>>());
}

#[test]
fn test_first_event_offsets_the_range() {
    let indices = processed_indices(3, 50, 1000);
    assert_eq!(indices, (1000..1050).collect::<Vec<u64>>());
}

#[test]
fn test_more_threads_than_events() {
    let indices = processed_indices(8, 3, 0);
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn test_single_thread_processes_in_index_order() {
    // With one worker the claim order is the index order.
    let seen = Arc::new(Mutex::new(Vec::new()));
    let module = RecordingModule { seen: seen.clone() };

    Engine::new(module, config(1, 25, 0)).unwrap().run().unwrap();

    assert_eq!(seen.lock().unwrap().clone(), (0..25).collect::<Vec<u64>>());
}

#[test]
fn test_zero_events_runs_empty_lifecycle() {
    let indices = processed_indices(4, 0, 0);
    assert!(indices.is_empty());
}

#[test]
fn test_no_index_claimed_twice_under_contention() {
    // Many cheap events on many threads: any double-claim would show
    // up as a duplicate index.
    let indices = processed_indices(8, 5000, 0);
    let unique: HashSet<u64> = indices.iter().copied().collect();
    assert_eq!(unique.len(), indices.len(), "an event index was processed twice");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_partition_covers_range_exactly(
        n_threads in 1usize..=8,
        n_events in 0u64..=200,
        first_event in 0u64..=10_000,
    ) {
        let indices = processed_indices(n_threads, n_events, first_event);
        let expected: Vec<u64> = (first_event..first_event + n_events).collect();
        prop_assert_eq!(indices, expected);
    }
}
