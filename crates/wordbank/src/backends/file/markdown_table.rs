//! 📝 Markdown pipe tables → records.
//!
//! Word lists have a habit of living in wiki pages and README files:
//!
//! ```text
//! | 영어 | 한글 | 카테고리 | 난이도 |
//! |------|------|----------|--------|
//! | apple | 사과 | Nature | easy |
//! ```
//!
//! The first row followed by a `---` separator is the header. Header cells are
//! lowercased with inner whitespace turned into `_`, then handed to serde as
//! object keys, so every alias `Record` accepts works here too.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use crate::common::Record;

/// 🔑 Header names that mean "this is the term column".
const TERM_HEADERS: [&str; 3] = ["word", "term", "영어"];

fn is_table_row(line: &str) -> bool {
    line.starts_with('|')
}

fn is_separator_row(line: &str) -> bool {
    is_table_row(line)
        && line.contains("---")
        && line
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

/// ✂️ `| a | b |` → `["a", "b"]`. Positional: an empty middle cell stays an empty cell.
fn split_cells(line: &str) -> Vec<String> {
    let inner = line.trim();
    let inner = inner.strip_prefix('|').unwrap_or(inner);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

fn normalize_header(cell: &str) -> String {
    cell.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// 📋 Parses the first pipe table in `text`.
///
/// Rows whose term cell is empty are skipped (wiki tables love a trailing blank row).
/// Any other missing or invalid field fails with the 1-based line number.
pub(crate) fn parse_markdown_table(text: &str) -> Result<Vec<Record>> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let header_at = lines
        .windows(2)
        .position(|pair| is_table_row(pair[0]) && !is_separator_row(pair[0]) && is_separator_row(pair[1]))
        .context("💀 no Markdown table found: expected a `| header |` row followed by a `|---|` separator")?;

    let headers: Vec<String> = split_cells(lines[header_at])
        .iter()
        .map(|h| normalize_header(h))
        .collect();
    if !headers.iter().any(|h| TERM_HEADERS.contains(&h.as_str())) {
        bail!(
            "💀 the Markdown table has no term column. Headers were: {}. Expected one of: {}",
            headers.join(", "),
            TERM_HEADERS.join(", ")
        );
    }

    let mut records = Vec::new();
    for (offset, line) in lines.iter().enumerate().skip(header_at + 2) {
        if !is_table_row(line) {
            // -- 🏁 the table ended. whatever comes next is somebody else's prose.
            break;
        }
        let line_number = offset + 1;
        let mut row = Map::new();
        for (header, cell) in headers.iter().zip(split_cells(line)) {
            if !cell.is_empty() {
                row.insert(header.clone(), Value::String(cell));
            }
        }

        let has_term = TERM_HEADERS.iter().any(|h| row.contains_key(*h));
        if !has_term {
            continue;
        }

        let record: Record = serde_json::from_value(Value::Object(row))
            .with_context(|| format!("💀 Markdown table row on line {line_number} is not a valid word"))?;
        records.push(record);
    }

    Ok(records)
}
