// ai
//! 🎬 *[the chunk has been cut. the sink awaits. but someone... must assemble the payload.]*
//!
//! 📦 The Collectors module: payload assembly, extracted and dignified.
//!
//! Takes a slice of serialized record strings and assembles them into a single
//! payload string in the wire format the sink expects.
//!
//! 🧠 Knowledge graph:
//! - **JSON Array** (`JsonArrayCollector`): `[rec,rec,rec]`. The REST table endpoint
//!   wants exactly this for an insert-many.
//! - **NDJSON** (`NdjsonCollector`): `\n`-delimited. The file sink appends these.
//! - Zero re-parsing: records are serialized once by `serialize_records`, then framed.
//!
//! ```text
//! BatchLoader:
//!   chunk → sink.insert_many(chunk) → serialize_records → collector.collect → wire
//! ```
//!
//! 🦆 (the duck collects... ducks? rubber ones? unclear. the duck has no comment.)

use anyhow::{Context, Result};

use crate::common::Record;

/// 📦 Assembles serialized record strings into a final payload format.
///
/// The input strings are already valid JSON objects. The collector only adds
/// delimiters and framing.
pub(crate) trait PayloadCollector: std::fmt::Debug {
    fn collect(&self, items: &[String]) -> String;
}

/// 📡 Newline-Delimited JSON. One record per line, trailing `\n` on every line,
/// so appending chunk after chunk to the same file stays valid NDJSON.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NdjsonCollector;

impl PayloadCollector for NdjsonCollector {
    #[inline]
    fn collect(&self, items: &[String]) -> String {
        // 🧮 Pre-allocate: sum of all strings + 1 newline per string. No reallocs. No drama.
        let estimated_size: usize = items.iter().map(|s| s.len() + 1).sum();
        let mut payload = String::with_capacity(estimated_size);
        for item in items {
            payload.push_str(item);
            payload.push('\n');
        }
        payload
    }
}

/// 📦 JSON Array format: `[rec1,rec2,rec3]`.
///
/// Brackets and commas, assembled by hand in a `String::with_capacity`, like
/// artisans at a craft fair who specialize in very fast string concatenation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JsonArrayCollector;

impl PayloadCollector for JsonArrayCollector {
    #[inline]
    fn collect(&self, items: &[String]) -> String {
        // 🧮 brackets(2) + sum of strings + commas(max n-1)
        let commas = items.len().saturating_sub(1);
        let estimated_size: usize = 2 + items.iter().map(|s| s.len()).sum::<usize>() + commas;
        let mut payload = String::with_capacity(estimated_size);
        payload.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                payload.push(',');
            }
            payload.push_str(item);
        }
        payload.push(']');
        payload
    }
}

/// 🔄 One JSON object string per record, in chunk order.
pub(crate) fn serialize_records(chunk: &[Record]) -> Result<Vec<String>> {
    chunk
        .iter()
        .map(|record| {
            serde_json::to_string(record).with_context(|| {
                format!("💀 record '{}' refused to become JSON", record.term)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Category, Difficulty};

    #[test]
    fn ndjson_the_one_where_multiple_records_get_newlines() {
        let collector = NdjsonCollector;
        let items = vec![
            String::from(r#"{"word":"job"}"#),
            String::from(r#"{"word":"work"}"#),
        ];
        let result = collector.collect(&items);
        assert_eq!(result, "{\"word\":\"job\"}\n{\"word\":\"work\"}\n");
    }

    #[test]
    fn ndjson_the_one_where_empty_vec_produces_nothing() {
        // 🧪 No records, no payload. The void stares back. 🦆
        assert!(NdjsonCollector.collect(&[]).is_empty());
    }

    #[test]
    fn json_array_the_one_where_records_become_an_array() {
        let items = vec![
            String::from(r#"{"doc":1}"#),
            String::from(r#"{"doc":2}"#),
            String::from(r#"{"doc":3}"#),
        ];
        assert_eq!(
            JsonArrayCollector.collect(&items),
            r#"[{"doc":1},{"doc":2},{"doc":3}]"#
        );
    }

    #[test]
    fn json_array_the_one_where_empty_vec_is_empty_array() {
        assert_eq!(JsonArrayCollector.collect(&[]), "[]");
    }

    #[test]
    fn json_array_the_one_where_single_record_has_no_commas() {
        // 🧪 One record, no commas. Like a party with one guest. Awkward but valid.
        let items = vec![String::from(r#"{"lonely":true}"#)];
        assert_eq!(JsonArrayCollector.collect(&items), r#"[{"lonely":true}]"#);
    }

    #[test]
    fn the_one_where_serialized_chunk_parses_back_as_a_json_array() {
        let the_chunk = vec![
            Record::new("salary", "급여", Category::Career, Difficulty::Easy),
            Record::new("tenure", "종신재직권", Category::Education, Difficulty::Hard),
        ];
        let the_payload = JsonArrayCollector.collect(&serialize_records(&the_chunk).unwrap());
        let the_parsed: Vec<Record> = serde_json::from_str(&the_payload).unwrap();
        assert_eq!(the_parsed, the_chunk);
    }
}
