//! 📚 wordbank: read a vocabulary dataset, check it, and load it into a hosted
//! table in chunks, stopping at the first chunk the table refuses.
//!
//! ```text
//! SourceBackend ──load_records──▶ validate ──▶ BatchLoader ──insert_many×N──▶ SinkBackend
//! ```

pub mod app_config;
pub mod backends;
mod collectors;
pub mod common;
pub mod loader;
mod progress;
pub mod validate;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::info;

use crate::app_config::{AppConfig, SourceConfig};
use crate::backends::{SinkBackend, Source, SourceBackend};
use crate::common::{Category, Difficulty, Record};
use crate::loader::{BatchLoader, LoadReport};
use crate::progress::ProgressMetrics;

/// 📊 What a dataset looks like, without sending any of it anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetStats {
    pub total: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub by_difficulty: BTreeMap<Difficulty, usize>,
}

impl DatasetStats {
    pub fn from_records(records: &[Record]) -> Self {
        let mut stats = Self {
            total: records.len(),
            ..Self::default()
        };
        for record in records {
            *stats.by_category.entry(record.category).or_default() += 1;
            *stats.by_difficulty.entry(record.difficulty).or_default() += 1;
        }
        stats
    }
}

fn describe_source(source_config: &SourceConfig) -> String {
    match source_config {
        SourceConfig::File(file) => file.file_name.clone(),
        SourceConfig::InMemory(_) => "inline records".to_string(),
    }
}

/// 📚 Load and validate the dataset the config points at.
pub async fn load_dataset(app_config: &AppConfig) -> Result<Vec<Record>> {
    let mut source = SourceBackend::from_config(&app_config.source_config)
        .await
        .context("💀 could not set up the dataset source")?;
    let records = source
        .load_records()
        .await
        .context("💀 could not load the dataset")?;
    validate::validate_records(&records)?;
    info!(
        "📚 {} records ready from {}",
        records.len(),
        describe_source(&app_config.source_config)
    );
    Ok(records)
}

/// 🔍 `--validate-only`: load, validate, count. Nothing leaves the process.
pub async fn validate_only(app_config: &AppConfig) -> Result<DatasetStats> {
    let records = load_dataset(app_config).await?;
    Ok(DatasetStats::from_records(&records))
}

/// 🚀 The whole show: load the dataset, build the sink, send the chunks, report.
///
/// A rejected chunk is not an `Err`; it is in the returned report. `Err` means we
/// never got going (config, dataset, validation, sink construction) or the sink
/// could not be closed.
pub async fn run(app_config: AppConfig) -> Result<LoadReport> {
    let records = load_dataset(&app_config).await?;

    let sink = SinkBackend::from_config(&app_config.sink_config)
        .await
        .context("💀 could not set up the destination")?;

    let progress = ProgressMetrics::new(
        &describe_source(&app_config.source_config),
        records.len(),
    );
    let mut loader = BatchLoader::new(sink, app_config.runtime.batch_size);
    let report = loader.load(&records, &progress).await;
    loader
        .close()
        .await
        .context("💀 the destination could not be closed cleanly")?;
    progress.finish(&report);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::{RuntimeConfig, SinkConfig};
    use crate::backends::{FileSinkConfig, FileSourceConfig, InMemorySinkConfig, InMemorySourceConfig};
    use std::num::NonZeroUsize;

    fn words(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                let category = Category::ALL[i % Category::ALL.len()];
                let difficulty = Difficulty::ALL[i % Difficulty::ALL.len()];
                Record::new(format!("w{i}"), format!("뜻{i}"), category, difficulty)
            })
            .collect()
    }

    fn inline_config(records: Vec<Record>, sink_config: SinkConfig, batch_size: usize) -> AppConfig {
        AppConfig {
            source_config: SourceConfig::InMemory(InMemorySourceConfig { records }),
            sink_config,
            runtime: RuntimeConfig {
                batch_size: NonZeroUsize::new(batch_size).unwrap(),
            },
        }
    }

    #[tokio::test]
    async fn the_one_where_the_whole_show_lands_in_a_file() {
        let the_dir = tempfile::tempdir().unwrap();
        let the_out = the_dir.path().join("landed.ndjson");
        let the_config = inline_config(
            words(25),
            SinkConfig::File(FileSinkConfig {
                file_name: the_out.to_string_lossy().into_owned(),
            }),
            10,
        );

        let the_report = run(the_config).await.unwrap();
        assert_eq!(the_report.persisted, 25);
        assert_eq!(the_report.chunk_count, 3);

        let the_lines = std::fs::read_to_string(&the_out).unwrap();
        let the_landed: Vec<Record> = the_lines
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(the_landed, words(25));
    }

    #[tokio::test]
    async fn the_one_where_a_rejected_chunk_is_a_report_not_an_error() {
        let the_config = inline_config(
            words(250),
            SinkConfig::InMemory(InMemorySinkConfig {
                fail_on_chunk: Some(2),
            }),
            100,
        );
        let the_report = run(the_config).await.expect("chunk failures are outcomes");
        assert_eq!(the_report.persisted, 100);
        assert!(!the_report.is_complete());
    }

    #[tokio::test]
    async fn the_one_where_bad_data_never_reaches_the_sink() {
        let mut the_records = words(5);
        the_records[3].translation = " ".into();
        let the_dir = tempfile::tempdir().unwrap();
        let the_out = the_dir.path().join("never.ndjson");
        let the_config = inline_config(
            the_records,
            SinkConfig::File(FileSinkConfig {
                file_name: the_out.to_string_lossy().into_owned(),
            }),
            2,
        );

        let the_error = run(the_config).await.unwrap_err();
        assert!(format!("{the_error:#}").contains("record #4"));
        assert!(!the_out.exists(), "validation must fail before the sink is even built");
    }

    #[tokio::test]
    async fn the_one_where_validate_only_counts_without_sending() {
        let the_dir = tempfile::tempdir().unwrap();
        let the_dataset = the_dir.path().join("words.json");
        std::fs::write(&the_dataset, serde_json::to_string(&words(30)).unwrap()).unwrap();

        let the_config = AppConfig {
            source_config: SourceConfig::File(FileSourceConfig {
                file_name: the_dataset.to_string_lossy().into_owned(),
                format: None,
            }),
            sink_config: SinkConfig::InMemory(InMemorySinkConfig::default()),
            runtime: RuntimeConfig::default(),
        };

        let the_stats = validate_only(&the_config).await.unwrap();
        assert_eq!(the_stats.total, 30);
        assert_eq!(the_stats.by_category[&Category::Education], 2);
        assert_eq!(the_stats.by_difficulty[&Difficulty::Hard], 10);
        assert_eq!(the_stats.by_category.values().sum::<usize>(), 30);
    }
}
