//! ✅ Record validation: the bouncer before the bus.
//!
//! Category and difficulty are enums, so a made-up tag never even becomes a
//! `Record`; that fight happens at parse time. What's left for us is the text:
//! a blank term or a blank translation would sail straight into the table and
//! sit there, silently useless, until a kid gets quizzed on "".
//!
//! Every record is checked, not just the first bad one, so a dataset with ten
//! problems gets one error listing ten problems instead of ten round trips.
//! Duplicates are allowed. Uniqueness is the destination's call.

use anyhow::{Result, bail};
use tracing::debug;

use crate::common::Record;

/// 🔍 One complaint about one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// 1-based position in the dataset
    pub position: usize,
    pub term: String,
    pub problem: &'static str,
}

/// 📋 Every violation in dataset order. Empty means the dataset is fit to load.
pub fn find_violations(records: &[Record]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (index, record) in records.iter().enumerate() {
        if record.term.trim().is_empty() {
            violations.push(Violation {
                position: index + 1,
                term: record.term.clone(),
                problem: "term is empty",
            });
        }
        if record.translation.trim().is_empty() {
            violations.push(Violation {
                position: index + 1,
                term: record.term.clone(),
                problem: "translation is empty",
            });
        }
    }
    violations
}

/// ✅ Fails with a readable list if any record is unfit. Runs before the first chunk.
pub fn validate_records(records: &[Record]) -> Result<()> {
    let violations = find_violations(records);
    if violations.is_empty() {
        debug!("✅ {} records passed validation", records.len());
        return Ok(());
    }

    let listing = violations
        .iter()
        .map(|v| format!("  - record #{} ('{}'): {}", v.position, v.term, v.problem))
        .collect::<Vec<_>>()
        .join("\n");
    bail!(
        "💀 {} problem(s) in the dataset, nothing was sent:\n{}",
        violations.len(),
        listing
    )
}
