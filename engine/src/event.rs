//! Event identity and the per-event execution scope
//!
//! The original engine exposed `RandU01()` and `QueueResult()` as
//! global entry points bound to "the current event" through
//! thread-local state, which made out-of-window calls a latent runtime
//! error. Here both live on [`EventScope`], an explicit argument to the
//! event hooks: a draw or an enqueue outside the Init/Run/Clear window
//! cannot be written down, because the scope does not exist outside it.

use crossbeam_channel::Sender;
use sha2::{Digest, Sha384};

use crate::results::{ResultError, ResultRecord};
use crate::rng::RngStream;

/// Size of an event identity, in bytes
pub const ID_FIELD_SIZE: usize = 48;

/// Engine-assigned identity of one event
///
/// The SHA-384 digest of the master seed and the event index. The
/// leading 8 bytes double as the seed of the event's RNG stream, so
/// the identity names the exact random sequence that produced the
/// event's results. Identical across runs with the same seed,
/// regardless of thread count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId([u8; ID_FIELD_SIZE]);

impl EventId {
    /// Derive the identity of `event_index` under `master_seed`.
    pub(crate) fn derive(master_seed: u64, event_index: u64) -> Self {
        let mut hasher = Sha384::new();
        hasher.update(master_seed.to_le_bytes());
        hasher.update(event_index.to_le_bytes());

        let digest = hasher.finalize();
        let mut id = [0u8; ID_FIELD_SIZE];
        id.copy_from_slice(&digest);
        Self(id)
    }

    /// The raw identity bytes (what the writer puts on disk).
    pub fn as_bytes(&self) -> &[u8; ID_FIELD_SIZE] {
        &self.0
    }

    /// Seed of the RNG stream belonging to this event.
    pub(crate) fn stream_seed(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.0[..8]);
        u64::from_le_bytes(bytes)
    }
}

/// Execution scope of a single in-flight event
///
/// Owned by exactly one worker for the duration of the event's
/// Init/Run/Clear triad. Carries the event's identity, its private RNG
/// stream (allocated before `event_init`, which may already draw), and
/// the producer side of the result queue.
pub struct EventScope<'run> {
    event_index: u64,
    event_id: EventId,
    stream: RngStream,
    results: &'run Sender<ResultRecord>,
}

impl<'run> EventScope<'run> {
    pub(crate) fn new(
        event_index: u64,
        master_seed: u64,
        results: &'run Sender<ResultRecord>,
    ) -> Self {
        let event_id = EventId::derive(master_seed, event_index);
        let stream = RngStream::from_seed(event_id.stream_seed());

        Self {
            event_index,
            event_id,
            stream,
            results,
        }
    }

    /// Index of the event this scope belongs to.
    pub fn event_index(&self) -> u64 {
        self.event_index
    }

    /// Identity of the event this scope belongs to.
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Uniform draw in `[0.0, 1.0)` from this event's stream.
    pub fn rand_u01(&mut self) -> f64 {
        self.stream.next_f64()
    }

    /// Queue a result for deferred writing.
    ///
    /// The record is stamped with this event's identity; modules only
    /// supply the payload. Blocks while the result queue is full.
    ///
    /// # Returns
    /// * `Err(ResultError::PayloadTooLarge)` - payload exceeds
    ///   [`RESULT_FIELD_SIZE`](crate::results::RESULT_FIELD_SIZE)
    /// * `Err(ResultError::QueueClosed)` - the I/O thread exited early
    ///   (output write failure); the record was dropped
    pub fn queue_result(&mut self, payload: &[u8]) -> Result<(), ResultError> {
        let record = ResultRecord::new(self.event_id, payload)?;
        self.results
            .send(record)
            .map_err(|_| ResultError::QueueClosed)
    }
}
