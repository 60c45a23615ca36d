use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::{
    fs::File,
    io::{self, AsyncWriteExt},
};
use tracing::trace;

use crate::backends::Sink;
use crate::collectors::{NdjsonCollector, PayloadCollector, serialize_records};
use crate::common::Record;

// -- 🚰 FileSinkConfig: cousin of FileSourceConfig, equally traumatized by disk full errors.
// KNOWLEDGE GRAPH: one backend = one config = one file. Clean.
#[derive(Debug, Deserialize, Clone)]
pub struct FileSinkConfig {
    pub file_name: String,
}

/// 🚰 FileSink: every chunk becomes NDJSON lines appended to one output file.
///
/// It's a BufWriter around a tokio `File`. Simple. Honest. Does not retry.
/// Handy for rehearsing a load ("what exactly would we send?") or exporting the
/// validated dataset in the exact shape the table receives it.
///
/// ⚠️ `File::create` truncates if the file exists. No warning. No backup. Just gone.
#[derive(Debug)]
pub(crate) struct FileSink {
    file_buf: io::BufWriter<File>,
    collector: NdjsonCollector,
    sink_config: FileSinkConfig,
}

impl FileSink {
    /// 🚀 Creates (or obliterates and recreates) the sink file and wraps it in a BufWriter.
    pub(crate) async fn new(sink_config: FileSinkConfig) -> Result<Self> {
        let file_handle = File::create(&sink_config.file_name).await.context(format!(
            "💀 The sink file '{}' could not be conjured into existence. \
                We stared at the path. The path stared back. \
                One of us was wrong about whether the parent directory existed. \
                It was us. It was always us.",
            &sink_config.file_name
        ))?;
        // -- 📦 BufWriter: because issuing one syscall per record is a war crime.
        let file_buf = io::BufWriter::new(file_handle);
        Ok(Self {
            file_buf,
            collector: NdjsonCollector,
            sink_config,
        })
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn insert_many(&mut self, chunk: &[Record]) -> Result<()> {
        let payload = self.collector.collect(&serialize_records(chunk)?);
        trace!(
            "📬 {} records ({} bytes) walked into the file sink, writing it all down",
            chunk.len(),
            payload.len()
        );
        self.file_buf
            .write_all(payload.as_bytes())
            .await
            .with_context(|| format!("💀 could not write chunk to '{}'", self.sink_config.file_name))?;
        Ok(())
    }

    /// 🗑️ Flush the BufWriter and close up shop.
    ///
    /// KNOWLEDGE GRAPH: `flush()` is explicit because async Drop is not a thing in Rust yet.
    async fn close(&mut self) -> Result<()> {
        trace!("🎬 final flush. the file sink takes its bow");
        self.file_buf.flush().await.context(
            "💀 Error flushing file: the buffer held its data to the very end, \
            like a hoarder who finally agreed to let go, only for the storage unit to be locked.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Category, Difficulty};

    #[tokio::test]
    async fn the_one_where_chunks_pile_up_as_ndjson_lines() {
        let the_dir = tempfile::tempdir().unwrap();
        let the_path = the_dir.path().join("out.ndjson");
        let mut the_sink = FileSink::new(FileSinkConfig {
            file_name: the_path.to_string_lossy().into_owned(),
        })
        .await
        .unwrap();

        let the_first = vec![
            Record::new("doctor", "의사", Category::Health, Difficulty::Easy),
            Record::new("nurse", "간호사", Category::Health, Difficulty::Easy),
        ];
        let the_second = vec![Record::new("vaccine", "백신", Category::Health, Difficulty::Medium)];
        the_sink.insert_many(&the_first).await.unwrap();
        the_sink.insert_many(&the_second).await.unwrap();
        the_sink.close().await.unwrap();

        let the_contents = std::fs::read_to_string(&the_path).unwrap();
        let the_lines: Vec<&str> = the_contents.lines().collect();
        assert_eq!(the_lines.len(), 3);
        let the_last: Record = serde_json::from_str(the_lines[2]).unwrap();
        assert_eq!(the_last.term, "vaccine");
        assert!(the_contents.ends_with('\n'));
    }

    #[tokio::test]
    async fn the_one_where_the_directory_does_not_exist() {
        let the_dir = tempfile::tempdir().unwrap();
        let the_path = the_dir.path().join("nope").join("out.ndjson");
        let the_result = FileSink::new(FileSinkConfig {
            file_name: the_path.to_string_lossy().into_owned(),
        })
        .await;
        assert!(the_result.is_err());
    }
}
