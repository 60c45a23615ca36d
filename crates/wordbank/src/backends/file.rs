// ai
//! 📂 Previously, on "Things That Could Go Wrong With A File"...
//!
//! The disk was quiet. Too quiet. A lone process had been tasked with reading
//! a word list. Just a word list, they said. Simple, they said.
//!
//! It was JSON. Then it was NDJSON. Then someone exported it from a wiki as a
//! Markdown table with Korean headers and gzipped it "to save space". It was 14KB.
//!
//! This module handles file-based I/O for wordbank. The source reads a whole
//! dataset file (json / ndjson / toml / markdown, optionally `.gz`), the sink
//! appends chunks as NDJSON through a BufWriter so a rehearsal run leaves a
//! faithful transcript of what would have been inserted.
//!
//! 🚰 file → bytes → (gunzip?) → text → Vec<Record> → BatchLoader → FileSink → BufWriter
//! 💀 Disk full → your problem now
//! 🦆 (mandatory, no notes)

mod file_sink;
mod file_source;
mod markdown_table;

pub(crate) use file_sink::FileSink;
pub use file_sink::FileSinkConfig;
pub(crate) use file_source::FileSource;
pub use file_source::{DatasetFormat, FileSourceConfig};
