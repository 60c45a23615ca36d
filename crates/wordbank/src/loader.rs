//! 🚚 The Batch Loader: the only part of this crate with a plot.
//!
//! 🎬 *[a list of words stands at the loading dock. a truck that fits N of them pulls up.]*
//!
//! Cut the records into contiguous chunks of at most `batch_size`, in order.
//! Send chunk 1. Wait for the verdict. Count it. Send chunk 2. Repeat until we
//! run out of chunks or a chunk comes back rejected, at which point we stop,
//! say which one, and leave the rest on the dock. No retries, no resume, no
//! heroics. One chunk in flight, ever.
//!
//! ```text
//! records ──partition──▶ [c1][c2][c3] ──▶ sink.insert_many(c1) ✅ total += |c1|
//!                                     ──▶ sink.insert_many(c2) 💀 stop, c3 never sent
//! ```

use std::num::NonZeroUsize;
use std::slice::Chunks;

use anyhow::Result;
use tracing::{debug, warn};

use crate::backends::Sink;
use crate::common::Record;
use crate::progress::ProgressMetrics;

/// ✂️ Contiguous, order-preserving chunks of at most `batch_size`; the last may be shorter.
/// Zero items means zero chunks.
pub fn partition<T>(items: &[T], batch_size: NonZeroUsize) -> Chunks<'_, T> {
    items.chunks(batch_size.get())
}

/// 🧮 `ceil(len / batch_size)`.
pub fn chunk_count(len: usize, batch_size: NonZeroUsize) -> usize {
    len.div_ceil(batch_size.get())
}

/// 💀 The one kind of loader failure: a chunk the store would not (or could not) take.
#[derive(Debug)]
pub struct ChunkFailure {
    /// 1-based, the way humans count chunks
    pub chunk_number: usize,
    pub chunk_size: usize,
    /// the first word of the rejected chunk, to help find the culprit
    pub first_term: Option<String>,
    pub error: anyhow::Error,
}

/// 📋 How the load went.
///
/// `persisted` only ever counts chunks the store acknowledged. If `failure` is set,
/// every chunk after `failure.chunk_number` was left unsent.
#[derive(Debug)]
pub struct LoadReport {
    pub planned: usize,
    pub persisted: usize,
    pub batch_size: usize,
    pub chunk_count: usize,
    pub chunks_completed: usize,
    pub failure: Option<ChunkFailure>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// 🚚 Owns the sink, knows the batch size, sends chunks one at a time.
#[derive(Debug)]
pub(crate) struct BatchLoader<S: Sink> {
    sink: S,
    batch_size: NonZeroUsize,
}

impl<S: Sink> BatchLoader<S> {
    pub(crate) fn new(sink: S, batch_size: NonZeroUsize) -> Self {
        Self { sink, batch_size }
    }

    /// 🚀 Sends every chunk in order; halts on the first failure.
    ///
    /// Never returns `Err`: a rejected chunk is an outcome, recorded in the report.
    pub(crate) async fn load(&mut self, records: &[Record], progress: &ProgressMetrics) -> LoadReport {
        let chunk_count = chunk_count(records.len(), self.batch_size);
        let mut report = LoadReport {
            planned: records.len(),
            persisted: 0,
            batch_size: self.batch_size.get(),
            chunk_count,
            chunks_completed: 0,
            failure: None,
        };
        debug!(
            "🚚 loading {} records in {} chunk(s) of up to {}",
            records.len(),
            chunk_count,
            self.batch_size
        );

        for (index, chunk) in partition(records, self.batch_size).enumerate() {
            let chunk_number = index + 1;
            match self.sink.insert_many(chunk).await {
                Ok(()) => {
                    report.persisted += chunk.len();
                    report.chunks_completed += 1;
                    progress.chunk_landed(chunk_number, chunk_count, chunk.len(), report.persisted);
                }
                Err(error) => {
                    progress.chunk_failed(chunk_number, chunk_count, chunk.len(), &error);
                    let first_term = chunk.first().map(|r| r.term.clone());
                    if let Some(ref term) = first_term {
                        warn!("🔎 the rejected chunk starts with '{}'", term);
                    }
                    report.failure = Some(ChunkFailure {
                        chunk_number,
                        chunk_size: chunk.len(),
                        first_term,
                        error,
                    });
                    break;
                }
            }
        }

        report
    }

    /// 🗑️ Close the sink. Call it after `load`, whatever the outcome.
    pub(crate) async fn close(&mut self) -> Result<()> {
        self.sink.close().await
    }

    #[cfg(test)]
    pub(crate) fn into_sink(self) -> S {
        self.sink
    }
}
