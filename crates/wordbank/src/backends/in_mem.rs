//! # Previously, on wordbank...
//!
//! 🎬 The words were ready. The database was not invited. Someone had to write a
//! backend so simple it lives entirely in RAM, gone the moment you blink.
//!
//! That someone was this module.
//!
//! `in_mem` provides an in-memory [`Source`] and [`Sink`]. The [`InMemorySource`]
//! hands back the records written inline in the config. The [`InMemorySink`]
//! keeps every chunk it receives behind an `Arc<Mutex<...>>` so callers can
//! inspect what arrived, and can be told to fail on a given chunk so the
//! failure path gets rehearsed without a network.
//!
//! 🦆
//!
//! ✅ No network calls. No disk I/O. No heartbeat. Just vibes and heap memory.

use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::backends::{Sink, Source};
use crate::common::Record;

/// 📦 Inline dataset: `[[source_config.InMemory.records]]` in TOML.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct InMemorySourceConfig {
    #[serde(default)]
    pub records: Vec<Record>,
}

/// 🔧 In-memory sink knobs. There is exactly one, and it is for breaking things.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct InMemorySinkConfig {
    /// 💣 1-based chunk number whose write should fail. `None` = everything succeeds.
    #[serde(default)]
    pub fail_on_chunk: Option<usize>,
}

/// 📦 The world's most predictable data source: it returns what you gave it.
#[derive(Debug)]
pub(crate) struct InMemorySource {
    config: InMemorySourceConfig,
}

impl InMemorySource {
    pub(crate) fn new(config: InMemorySourceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Source for InMemorySource {
    async fn load_records(&mut self) -> Result<Vec<Record>> {
        debug!(
            "📦 InMemorySource handing over {} inline records",
            self.config.records.len()
        );
        Ok(self.config.records.clone())
    }
}

/// 📦 A sink that never forgets.
///
/// 🔒 `Arc<Mutex<Vec<Vec<Record>>>>`: one inner `Vec` per chunk, in arrival order.
/// Clone-able because tests need to peek inside after handing the sink to the loader.
/// The `Arc` means every clone shares the same evidence locker.
#[derive(Debug, Clone, Default)]
pub(crate) struct InMemorySink {
    pub(crate) received: Arc<Mutex<Vec<Vec<Record>>>>,
    /// 🔢 chunks attempted so far, failed ones included
    attempts: usize,
    config: InMemorySinkConfig,
}

impl InMemorySink {
    pub(crate) fn new(config: InMemorySinkConfig) -> Self {
        Self {
            received: Arc::new(Mutex::new(Vec::new())),
            attempts: 0,
            config,
        }
    }

    /// 🔢 How many chunks have knocked on the door, including the one we slammed it on.
    pub(crate) fn attempts(&self) -> usize {
        self.attempts
    }
}

#[async_trait]
impl Sink for InMemorySink {
    async fn insert_many(&mut self, chunk: &[Record]) -> Result<()> {
        self.attempts += 1;
        if self.config.fail_on_chunk == Some(self.attempts) {
            bail!(
                "💀 in-memory sink was told to reject chunk {} and it is a sink of its word",
                self.attempts
            );
        }
        self.received.lock().await.push(chunk.to_vec());
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        // 🗑️ Cleanup routine: [REDACTED, there is nothing here]
        Ok(())
    }
}
