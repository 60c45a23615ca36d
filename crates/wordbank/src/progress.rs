// AI
//! 📊 progress.rs: "Are we there yet?" (every load, every time, forever.)
//!
//! One human-readable line per chunk that lands, one line for the chunk that
//! doesn't, and a summary table at the end. Lines go to stdout so they can be
//! piped and grepped; the indicatif bar lives on stderr and hides itself when
//! stderr is not a terminal. Every line is also a `tracing` event, for the logs.
//!
//! ⚠️ Watching this progress bar will not make it go faster. Science says no.
//!
//! 🦆 The duck has nothing to do with this module. It's just vibing.

use std::time::{Duration, Instant};

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{error, info};

use crate::loader::LoadReport;

/// 🔢 Formats a number with commas. "1000000 words" → "1,000,000 words", you're welcome, eyes.
pub(crate) fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// ⏱️ MM:SS, or HH:MM:SS if you should probably call your mom. It's been a while.
pub(crate) fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// ✅ The line for a chunk that made it. `chunk_number` is 1-based.
pub(crate) fn chunk_landed_line(chunk_number: usize, chunk_count: usize, size: usize, total: usize) -> String {
    format!(
        "✅ chunk {}/{}: {} records inserted (total: {})",
        chunk_number,
        chunk_count,
        format_number(size as u64),
        format_number(total as u64)
    )
}

/// 💀 The line for the chunk that didn't.
pub(crate) fn chunk_failed_line(chunk_number: usize, chunk_count: usize, size: usize, error: &anyhow::Error) -> String {
    format!(
        "💀 chunk {}/{} ({} records) failed: {:#}",
        chunk_number,
        chunk_count,
        format_number(size as u64),
        error
    )
}

/// 🍽️ The end-of-run table. Planned vs persisted, chunks, elapsed, and how it ended.
pub(crate) fn summary_table(report: &LoadReport, elapsed: Duration) -> Table {
    let rate = if elapsed.as_secs_f64() > 0.0 {
        report.persisted as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };
    let outcome = match &report.failure {
        None => "✅ complete".to_string(),
        Some(failure) => format!("💀 stopped at chunk {}", failure.chunk_number),
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let rows = [
        ("records planned", format_number(report.planned as u64)),
        ("records persisted", format_number(report.persisted as u64)),
        (
            "chunks",
            format!("{} / {}", report.chunks_completed, report.chunk_count),
        ),
        ("batch size", format_number(report.batch_size as u64)),
        ("elapsed", format_duration(elapsed)),
        ("records/s", format!("{:.1}", rate)),
        ("outcome", outcome),
    ];
    for (label, value) in rows {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// 📊 Tracks a load while it runs: the bar, the clock, and the lines.
///
/// # Ancient Proverb
/// "He who loads without a progress line, re-runs the whole thing to find out how far it got."
pub(crate) struct ProgressMetrics {
    progress_bar: ProgressBar,
    start_time: Instant,
}

impl std::fmt::Debug for ProgressMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // -- 🎭 ProgressBar is a diva and doesn't derive Debug
        f.debug_struct("ProgressMetrics")
            .field("position", &self.progress_bar.position())
            .field("elapsed", &self.start_time.elapsed())
            .finish()
    }
}

impl ProgressMetrics {
    /// 🚀 A bar sized to the number of records we intend to send.
    pub(crate) fn new(label: &str, total_records: usize) -> Self {
        let progress_bar = ProgressBar::with_draw_target(
            Some(total_records as u64),
            ProgressDrawTarget::stderr(),
        );
        // -- 🐛 the template is a literal; if it ever fails to parse we fall back to the default look
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} words ({elapsed})")
        {
            progress_bar.set_style(style.progress_chars("=>-"));
        }
        progress_bar.set_message(label.to_string());
        Self {
            progress_bar,
            start_time: Instant::now(),
        }
    }

    /// 🙈 Same bookkeeping, nothing drawn.
    #[cfg(test)]
    pub(crate) fn hidden(total_records: usize) -> Self {
        Self {
            progress_bar: ProgressBar::with_draw_target(
                Some(total_records as u64),
                ProgressDrawTarget::hidden(),
            ),
            start_time: Instant::now(),
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 📢 Print a line to stdout without tearing the bar on stderr.
    fn say(&self, line: &str) {
        self.progress_bar.suspend(|| println!("{line}"));
    }

    pub(crate) fn chunk_landed(&self, chunk_number: usize, chunk_count: usize, size: usize, total: usize) {
        let line = chunk_landed_line(chunk_number, chunk_count, size, total);
        info!(chunk = chunk_number, size, total, "{}", line);
        self.progress_bar.inc(size as u64);
        self.say(&line);
    }

    pub(crate) fn chunk_failed(&self, chunk_number: usize, chunk_count: usize, size: usize, error: &anyhow::Error) {
        let line = chunk_failed_line(chunk_number, chunk_count, size, error);
        error!(chunk = chunk_number, size, "{}", line);
        self.say(&line);
    }

    /// ✅ Close the bar and print the final word(s).
    pub(crate) fn finish(&self, report: &LoadReport) {
        if report.failure.is_some() {
            self.progress_bar.abandon();
        } else {
            self.progress_bar.finish();
        }
        let headline = format!(
            "📚 final result: {} records inserted",
            format_number(report.persisted as u64)
        );
        info!(persisted = report.persisted, planned = report.planned, "{}", headline);
        self.say(&headline);
        self.say(&summary_table(report, self.elapsed()).to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ChunkFailure;

    #[test]
    fn the_one_where_big_numbers_get_commas() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn the_one_where_durations_grow_an_hours_column_only_when_needed() {
        assert_eq!(format_duration(Duration::from_secs(65)), "01:05");
        assert_eq!(format_duration(Duration::from_secs(3661)), "01:01:01");
    }

    #[test]
    fn the_one_where_progress_lines_say_what_happened() {
        assert_eq!(
            chunk_landed_line(2, 3, 100, 200),
            "✅ chunk 2/3: 100 records inserted (total: 200)"
        );
        let the_error = anyhow::anyhow!("409 Conflict");
        assert_eq!(
            chunk_failed_line(3, 3, 50, &the_error),
            "💀 chunk 3/3 (50 records) failed: 409 Conflict"
        );
    }

    #[test]
    fn the_one_where_the_summary_admits_where_it_stopped() {
        let the_report = LoadReport {
            planned: 250,
            persisted: 100,
            batch_size: 100,
            chunk_count: 3,
            chunks_completed: 1,
            failure: Some(ChunkFailure {
                chunk_number: 2,
                chunk_size: 100,
                first_term: Some("economy".into()),
                error: anyhow::anyhow!("boom"),
            }),
        };
        let the_table = summary_table(&the_report, Duration::from_secs(2)).to_string();
        assert!(the_table.contains("1 / 3"), "{the_table}");
        assert!(the_table.contains("stopped at chunk 2"), "{the_table}");
        assert!(the_table.contains("50.0"), "{the_table}");
    }
}
