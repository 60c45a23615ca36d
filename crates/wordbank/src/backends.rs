//! 🔌 Backends: where the real I/O happens.
//!
//! 🚰 Source backends produce the word list, Sink backends swallow it one chunk
//! at a time. And in between, we panic! (kidding, we use anyhow)
//!
//! 🎭 This module is the casting agency. Need words from a JSON file? A Markdown
//! table someone pasted out of a wiki? Inline in the config because it's a demo?
//! Need them in a hosted Postgres table, an NDJSON file, or just RAM?
//! We've got a backend for that.
//!
//! 🦆 The duck is here because every file must have one. This is law. Do not question the duck.

use anyhow::Result;
use async_trait::async_trait;

use crate::app_config::{SinkConfig, SourceConfig};
use crate::common::Record;

pub(crate) mod file;
pub(crate) mod in_mem;
pub(crate) mod postgrest;

// 🎯 Re-export backend-specific configs so callers can do `backends::FileSourceConfig`
// instead of spelunking into `backends::file::file_source::FileSourceConfig`.
pub use file::{DatasetFormat, FileSinkConfig, FileSourceConfig};
pub use in_mem::{InMemorySinkConfig, InMemorySourceConfig};
pub use postgrest::PostgrestSinkConfig;

// ===== Source Trait and Backend Enum =====

/// 🚰 A source that produces the whole dataset, fully materialized, in order.
///
/// # Contract
/// - `load_records` is called once, before loading begins.
/// - Order matters: the loader chunks in exactly the order returned here.
#[async_trait]
pub(crate) trait Source: std::fmt::Debug {
    async fn load_records(&mut self) -> Result<Vec<Record>>;
}

/// 🎭 The many faces of a Source. Dispatches via `impl Source for SourceBackend`,
/// so callers never need to know whether the words came from disk or from the config.
#[derive(Debug)]
pub(crate) enum SourceBackend {
    InMemory(in_mem::InMemorySource),
    File(file::FileSource),
}

impl SourceBackend {
    /// 🏗️ Config in, source out.
    pub(crate) async fn from_config(config: &SourceConfig) -> Result<Self> {
        Ok(match config {
            SourceConfig::InMemory(c) => Self::InMemory(in_mem::InMemorySource::new(c.clone())),
            SourceConfig::File(c) => Self::File(file::FileSource::new(c.clone()).await?),
        })
    }
}

#[async_trait]
impl Source for SourceBackend {
    async fn load_records(&mut self) -> Result<Vec<Record>> {
        match self {
            SourceBackend::InMemory(source) => source.load_records().await,
            SourceBackend::File(source) => source.load_records().await,
        }
    }
}

// ===== Sink Trait and Backend Enum =====

/// 🕳️ A sink that persists chunks of records: the "insert many into a named table".
///
/// # Contract
/// - `insert_many` writes one chunk as one operation. `Ok` means the whole chunk
///   landed; `Err` means the store rejected it or never answered. No partial credit.
/// - `close` flushes whatever the sink buffers. MUST be called, success or failure.
///   Skipping `close` is a bug. It is also considered rude.
#[async_trait]
pub(crate) trait Sink: std::fmt::Debug {
    async fn insert_many(&mut self, chunk: &[Record]) -> Result<()>;
    async fn close(&mut self) -> Result<()>;
}

/// 🎭 The many faces of a Sink. Mirrors `SourceBackend` on the other end of the pipe.
#[derive(Debug)]
pub(crate) enum SinkBackend {
    InMemory(in_mem::InMemorySink),
    File(file::FileSink),
    Postgrest(postgrest::PostgrestSink),
}

impl SinkBackend {
    /// 🏗️ Builds the destination client from config. This is the injection point:
    /// credentials and endpoints come in here and nowhere else.
    pub(crate) async fn from_config(config: &SinkConfig) -> Result<Self> {
        Ok(match config {
            SinkConfig::InMemory(c) => Self::InMemory(in_mem::InMemorySink::new(c.clone())),
            SinkConfig::File(c) => Self::File(file::FileSink::new(c.clone()).await?),
            SinkConfig::Postgrest(c) => Self::Postgrest(postgrest::PostgrestSink::new(c.clone())?),
        })
    }
}

#[async_trait]
impl Sink for SinkBackend {
    async fn insert_many(&mut self, chunk: &[Record]) -> Result<()> {
        match self {
            SinkBackend::InMemory(sink) => sink.insert_many(chunk).await,
            SinkBackend::File(sink) => sink.insert_many(chunk).await,
            SinkBackend::Postgrest(sink) => sink.insert_many(chunk).await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            SinkBackend::InMemory(sink) => sink.close().await,
            SinkBackend::File(sink) => sink.close().await,
            SinkBackend::Postgrest(sink) => sink.close().await,
        }
    }
}
