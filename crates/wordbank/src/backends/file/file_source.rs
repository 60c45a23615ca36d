use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use serde::Deserialize;
use tracing::{debug, trace};

use super::markdown_table::parse_markdown_table;
use crate::backends::Source;
use crate::common::Record;

/// 🗂️ The shapes a dataset file can come in.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFormat {
    /// `[ {...}, {...} ]`
    Json,
    /// one object per line
    Ndjson,
    /// `[[words]]` array of tables
    Toml,
    /// a pipe table, headers in English or Korean
    Markdown,
}

impl DatasetFormat {
    /// 🔍 Guess the format from the file name. A trailing `.gz` is peeled off first,
    /// so `words.ndjson.gz` is NDJSON that happens to be wearing a coat.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let without_gz = file_name.strip_suffix(".gz").unwrap_or(file_name);
        let extension = Path::new(without_gz)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "ndjson" | "jsonl" => Some(Self::Ndjson),
            "toml" => Some(Self::Toml),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

// -- 📂 FileSourceConfig: "It's just a file", said no sysadmin ever before the disk filled up.
// KNOWLEDGE GRAPH: config lives co-located with the backend that uses it.
#[derive(Debug, Deserialize, Clone)]
pub struct FileSourceConfig {
    pub file_name: String,
    /// 🗂️ Explicit format. When absent, the extension decides.
    #[serde(default)]
    pub format: Option<DatasetFormat>,
}

impl FileSourceConfig {
    pub fn resolved_format(&self) -> Result<DatasetFormat> {
        match self.format {
            Some(format) => Ok(format),
            None => DatasetFormat::from_file_name(&self.file_name).with_context(|| {
                format!(
                    "💀 Can't tell what kind of dataset '{}' is from its name. \
                    Use .json, .ndjson, .jsonl, .toml or .md (optionally .gz), \
                    or set `format` explicitly.",
                    self.file_name
                )
            }),
        }
    }

    fn is_gzipped(&self) -> bool {
        self.file_name.ends_with(".gz")
    }
}

/// 🧾 `[[words]]` in TOML land.
#[derive(Debug, Deserialize)]
struct TomlDataset {
    #[serde(default)]
    words: Vec<Record>,
}

/// 📂 FileSource: reads the whole dataset file, parses it, hands back every record in order.
///
/// Word lists are small (hundreds to low thousands of rows), so the file is read in
/// one go; there is no paging. The format is resolved up front so a typo in the
/// extension fails before anything else happens.
#[derive(Debug)]
pub(crate) struct FileSource {
    source_config: FileSourceConfig,
    format: DatasetFormat,
}

impl FileSource {
    pub(crate) async fn new(source_config: FileSourceConfig) -> Result<Self> {
        let format = source_config.resolved_format()?;
        Ok(Self {
            source_config,
            format,
        })
    }

    async fn read_text(&self) -> Result<String> {
        let raw = tokio::fs::read(&self.source_config.file_name)
            .await
            .context(format!(
                "💀 The door to '{}' would not budge. We knocked. We pleaded. \
                We checked if it existed (it might not). We checked permissions (they might be wrong). \
                The door remained closed.",
                self.source_config.file_name
            ))?;
        trace!("📖 hauled {} bytes out of the dataset file", raw.len());

        let bytes = if self.source_config.is_gzipped() {
            let mut inflated = Vec::with_capacity(raw.len() * 4);
            GzDecoder::new(raw.as_slice())
                .read_to_end(&mut inflated)
                .with_context(|| {
                    format!(
                        "💀 '{}' ends in .gz but did not gunzip. It was a lie wearing an extension.",
                        self.source_config.file_name
                    )
                })?;
            inflated
        } else {
            raw
        };

        String::from_utf8(bytes).with_context(|| {
            format!(
                "💀 '{}' is not valid UTF-8. Hangul needs UTF-8. Everyone needs UTF-8.",
                self.source_config.file_name
            )
        })
    }
}

#[async_trait]
impl Source for FileSource {
    async fn load_records(&mut self) -> Result<Vec<Record>> {
        let text = self.read_text().await?;
        let records = parse_dataset(&text, self.format).with_context(|| {
            format!(
                "💀 failed to parse '{}' as {:?}",
                self.source_config.file_name, self.format
            )
        })?;
        debug!(
            "📚 {} records loaded from '{}'",
            records.len(),
            self.source_config.file_name
        );
        Ok(records)
    }
}

/// 🔀 Text + format → records.
pub(crate) fn parse_dataset(text: &str, format: DatasetFormat) -> Result<Vec<Record>> {
    match format {
        DatasetFormat::Json => {
            serde_json::from_str(text).context("💀 expected a JSON array of word objects")
        }
        DatasetFormat::Ndjson => parse_ndjson(text),
        DatasetFormat::Toml => {
            let dataset: TomlDataset =
                toml::from_str(text).context("💀 expected a TOML file with [[words]] tables")?;
            Ok(dataset.words)
        }
        DatasetFormat::Markdown => parse_markdown_table(text),
    }
}

/// 📡 One record per line. Blank lines are skipped, bad lines are named by number.
fn parse_ndjson(text: &str) -> Result<Vec<Record>> {
    let bytes = text.as_bytes();
    let mut records = Vec::new();
    let mut line_start = 0usize;
    let mut line_number = 0usize;

    // -- 🔍 memchr finds the newlines; the last line may not have one, so it gets a turn too
    let line_ends = memchr::memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len()));
    for line_end in line_ends {
        if line_start > bytes.len() {
            break;
        }
        line_number += 1;
        let line = text[line_start..line_end].trim();
        line_start = line_end + 1;
        if line.is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(line)
            .with_context(|| format!("💀 NDJSON line {line_number} is not a valid word"))?;
        records.push(record);
    }

    if records.is_empty() && !text.trim().is_empty() {
        bail!("💀 NDJSON file had text but no records. Impressive, honestly.");
    }
    Ok(records)
}
