//! 🔧 App Configuration: the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." (every developer at 3am) 🦆
//!
//! 🏗️ Powered by Figment, because manually parsing env vars is a form of
//! self-harm that even the borrow checker wouldn't approve of.

use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use tracing::info;

use crate::backends::{
    FileSinkConfig, FileSourceConfig, InMemorySinkConfig, InMemorySourceConfig,
    PostgrestSinkConfig,
};

/// 📦 The AppConfig: one struct to rule them all.
///
/// ```toml
/// [runtime]
/// batch_size = 100
///
/// [source_config.File]
/// file_name = "data/english_words.toml"
///
/// [sink_config.Postgrest]
/// url = "https://abcd.supabase.co"
/// ```
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// 📚 Where the words come from.
    pub source_config: SourceConfig,
    /// 🕳️ Where the words go.
    pub sink_config: SinkConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// 🚰 The dataset origin. Externally tagged: `[source_config.File]`.
///
/// Env keys arrive lowercased from figment, hence the aliases.
#[derive(Debug, Deserialize, Clone)]
pub enum SourceConfig {
    #[serde(alias = "file")]
    File(FileSourceConfig),
    #[serde(alias = "in_memory")]
    InMemory(InMemorySourceConfig),
}

/// 🕳️ The destination. Externally tagged: `[sink_config.Postgrest]`.
#[derive(Debug, Deserialize, Clone)]
pub enum SinkConfig {
    #[serde(alias = "postgrest")]
    Postgrest(PostgrestSinkConfig),
    #[serde(alias = "file")]
    File(FileSinkConfig),
    #[serde(alias = "in_memory")]
    InMemory(InMemorySinkConfig),
}

/// ⚙️ Knobs for the loader itself.
#[derive(Debug, Deserialize, Clone)]
pub struct RuntimeConfig {
    /// 📦 Records per insert. `NonZeroUsize`, so `batch_size = 0` dies at parse time
    /// instead of looping forever or dividing by zero later.
    #[serde(default = "default_batch_size", alias = "chunk_size")]
    pub batch_size: NonZeroUsize,
}

// 📦 100 per request: small enough for any gateway's body limit, big enough to finish before lunch.
fn default_batch_size() -> NonZeroUsize {
    NonZeroUsize::new(100).unwrap_or(NonZeroUsize::MIN)
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

impl AppConfig {
    /// 🎛️ The CLI flag wins over file and env.
    pub fn with_batch_size(mut self, batch_size: Option<NonZeroUsize>) -> Self {
        if let Some(batch_size) = batch_size {
            self.runtime.batch_size = batch_size;
        }
        self
    }
}

/// 🚀 Load the config from `WORDBANK_*` env vars and an optional TOML file.
///
/// 📐 DESIGN NOTE:
///   - `config_file_name` None  → env vars only.
///   - `config_file_name` Some  → env vars + TOML file, merged. TOML wins on conflicts.
///   - Nested keys use `__`: `WORDBANK_RUNTIME__BATCH_SIZE=250`,
///     `WORDBANK_SINK_CONFIG__POSTGREST__URL=https://...`.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    let config = Figment::new().merge(Env::prefixed("WORDBANK_").split("__"));

    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (WORDBANK_*). \
             The file exists in our hearts, but apparently not in a shape serde likes.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (WORDBANK_*). \
                 No file was provided, so this one's all on the environment. Classic."
            .to_string(),
    };

    config.extract().context(context_msg)
}
