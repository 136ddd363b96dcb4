//! Result records and the worker-to-I/O pipeline
//!
//! Workers never touch the output file. During an event they enqueue
//! [`ResultRecord`]s onto a bounded multi-producer channel; a single
//! dedicated I/O thread drains it and either hands each record to the
//! module's reducer hook or appends it to the output file.
//!
//! On-disk record layout (the only file format this engine owns):
//! 48 identity bytes, then the payload length as a little-endian `u32`,
//! then the payload itself.

mod writer;

pub(crate) use writer::run_writer;

use std::io::Write;

use thiserror::Error;

use crate::event::EventId;

/// Maximum payload size of a single result record, in bytes
pub const RESULT_FIELD_SIZE: usize = 0x800;

/// Errors that can occur when queueing a result
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResultError {
    /// The payload exceeds [`RESULT_FIELD_SIZE`]
    #[error("Result payload is {len} bytes, limit is {limit}")]
    PayloadTooLarge { len: usize, limit: usize },

    /// The I/O thread is gone (it only exits early on a write failure),
    /// so the record cannot be delivered
    #[error("Result queue is closed")]
    QueueClosed,
}

/// One unit of simulation output
///
/// The identity is stamped by the engine with the enqueuing event's
/// identity; modules only supply the payload. Records are immutable
/// once queued and consumed exactly once by the I/O thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    id: EventId,
    payload: Vec<u8>,
}

impl ResultRecord {
    /// Build a record, enforcing the payload cap.
    pub(crate) fn new(id: EventId, payload: &[u8]) -> Result<Self, ResultError> {
        if payload.len() > RESULT_FIELD_SIZE {
            return Err(ResultError::PayloadTooLarge {
                len: payload.len(),
                limit: RESULT_FIELD_SIZE,
            });
        }

        Ok(Self {
            id,
            payload: payload.to_vec(),
        })
    }

    /// Identity of the event that produced this record.
    pub fn id(&self) -> &EventId {
        &self.id
    }

    /// The module-supplied payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Serialize the record in the on-disk layout.
    pub(crate) fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(self.id.as_bytes())?;
        out.write_all(&(self.payload.len() as u32).to_le_bytes())?;
        out.write_all(&self.payload)
    }
}
