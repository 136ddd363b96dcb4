//! The I/O reduction thread
//!
//! Single consumer of the result queue. For every drained record the
//! module's `reduce_result` hook gets first refusal; records it
//! declines are appended to the output file in the contract layout.
//! Because there is exactly one consumer thread, reducer invocations
//! never overlap and dequeue order equals write order. Order across
//! events from different workers is unspecified, but one event's own
//! records keep their relative order (the channel is FIFO per
//! producer).

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crossbeam_channel::Receiver;
use tracing::{debug, error};

use crate::module::SimulationModule;
use crate::results::ResultRecord;

/// Counters reported by the writer when the queue closes.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct WriterStats {
    /// Records appended to the output file by the engine
    pub written: u64,
    /// Records consumed by the module's reducer hook
    pub reduced: u64,
}

/// Drain the result queue until every producer is gone.
///
/// The output file is only created once the first non-reduced record
/// arrives; a module that reduces everything leaves no file behind.
/// A write failure abandons the drain: dropping the receiver
/// disconnects the queue, so blocked producers fail fast with
/// `ResultError::QueueClosed` instead of deadlocking.
pub(crate) fn run_writer<M: SimulationModule>(
    module: &M,
    sim: &M::SimContext,
    output_file: &Path,
    results: Receiver<ResultRecord>,
) -> Result<WriterStats, std::io::Error> {
    let mut stats = WriterStats::default();
    let mut out: Option<BufWriter<File>> = None;

    for record in results.iter() {
        if module.reduce_result(sim, output_file, record.id(), record.payload()) {
            stats.reduced += 1;
            continue;
        }

        if out.is_none() {
            let file = open_output(output_file)?;
            debug!(path = %output_file.display(), "output file opened");
            out = Some(BufWriter::new(file));
        }
        if let Some(writer) = out.as_mut() {
            if let Err(err) = record.write_to(writer) {
                error!(path = %output_file.display(), %err, "result write failed");
                return Err(err);
            }
            stats.written += 1;
        }
    }

    if let Some(mut writer) = out {
        writer.flush()?;
    }

    debug!(
        written = stats.written,
        reduced = stats.reduced,
        "result queue drained"
    );
    Ok(stats)
}

fn open_output(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
}
