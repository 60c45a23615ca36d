//! 🚀 wordbank-cli: the front door, the bouncer, the maitre d' of wordbank.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 Thin wrapper: parse args, set up logging, load config, then let the
//! library do the heavy lifting. Like a manager. 🦆

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};
use tracing::error;
use tracing_subscriber::EnvFilter;
use wordbank::DatasetStats;
use wordbank::app_config::AppConfig;

/// 📚 Load a vocabulary dataset into a hosted table, one chunk at a time.
#[derive(Debug, Parser)]
#[command(name = "wordbank", version)]
struct Cli {
    /// Config file. Missing file means env vars (WORDBANK_*) only.
    #[arg(default_value = "wordbank.toml")]
    config: PathBuf,

    /// Records per insert request; overrides runtime.batch_size.
    #[arg(long)]
    batch_size: Option<NonZeroUsize>,

    /// Load and check the dataset, print counts, send nothing.
    #[arg(long)]
    validate_only: bool,
}

/// 🔒 `Some(path)` if the config file is there, `None` if we're going env-only.
fn existing_config_file(config_file: &Path) -> Result<Option<&Path>> {
    let it_exists = config_file.try_exists().context(format!(
        "💀 Couldn't even check whether the config file exists. Permissions, maybe? \
         Was checking here: '{}'",
        config_file.display()
    ))?;
    Ok(it_exists.then_some(config_file))
}

/// 📊 Two little tables: words per category, words per difficulty.
fn stats_tables(stats: &DatasetStats) -> (Table, Table) {
    let mut by_category = Table::new();
    by_category.load_preset(UTF8_FULL_CONDENSED);
    by_category.set_header(vec!["category", "words"]);
    for (category, count) in &stats.by_category {
        by_category.add_row(vec![
            Cell::new(category),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }

    let mut by_difficulty = Table::new();
    by_difficulty.load_preset(UTF8_FULL_CONDENSED);
    by_difficulty.set_header(vec!["difficulty", "words"]);
    for (difficulty, count) in &stats.by_difficulty {
        by_difficulty.add_row(vec![
            Cell::new(difficulty),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    (by_category, by_difficulty)
}

async fn validate_only(app_config: &AppConfig) -> Result<()> {
    let stats = wordbank::validate_only(app_config).await?;
    let (by_category, by_difficulty) = stats_tables(&stats);
    println!("✅ {} records are fit to load. Nothing was sent.", stats.total);
    println!("{by_category}");
    println!("{by_difficulty}");
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config_file = existing_config_file(&cli.config)?;

    // 🔧 the moment we find out if someone put a tab where a space should be
    let app_config = wordbank::app_config::load_config(config_file)
        .context("💀 Couldn't load the config. Check the file (and any WORDBANK_* env vars) for something obvious.")?
        .with_batch_size(cli.batch_size);

    if cli.validate_only {
        return validate_only(&app_config).await;
    }

    // -- 🚚 a rejected chunk is in the report, already printed. only setup errors come back as Err.
    wordbank::run(app_config).await?;
    Ok(())
}

fn looks_like_a_connection_problem(cause: &str) -> bool {
    [
        "error sending request",
        "connection refused",
        "Connection refused",
        "tcp connect error",
        "dns error",
    ]
    .iter()
    .any(|needle| cause.contains(needle))
}

/// 🚀 main(): the "I pressed enter and held my breath" moment.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 📡 println! debugging is a lifestyle choice we're trying to move past
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        error!("💀 error: {}", err);
        // -- 🧅 peel the onion of sadness, one layer at a time
        let mut the_vibes_are_giving_connection_issues = false;
        for cause in err.chain().skip(1) {
            error!("⚠️  cause: {}", cause);
            if looks_like_a_connection_problem(&cause.to_string()) {
                the_vibes_are_giving_connection_issues = true;
            }
        }

        if the_vibes_are_giving_connection_issues {
            error!(
                "🔧 hint: looks like the database isn't reachable. \
                 Double-check the url in [sink_config.Postgrest] and that the project is up. \
                 Even servers need a nudge sometimes. ☕"
            );
        }

        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordbank::common::{Category, Difficulty, Record};

    #[test]
    fn the_one_where_the_args_parse_like_the_readme_says() {
        let the_cli = Cli::try_parse_from(["wordbank"]).unwrap();
        assert_eq!(the_cli.config, PathBuf::from("wordbank.toml"));
        assert!(the_cli.batch_size.is_none());
        assert!(!the_cli.validate_only);

        let the_cli =
            Cli::try_parse_from(["wordbank", "prod.toml", "--batch-size", "250", "--validate-only"])
                .unwrap();
        assert_eq!(the_cli.config, PathBuf::from("prod.toml"));
        assert_eq!(the_cli.batch_size.map(NonZeroUsize::get), Some(250));
        assert!(the_cli.validate_only);
    }

    #[test]
    fn the_one_where_batch_size_zero_never_gets_past_clap() {
        assert!(Cli::try_parse_from(["wordbank", "--batch-size", "0"]).is_err());
    }

    #[test]
    fn the_one_where_a_missing_config_means_env_only() {
        let the_dir = tempfile::tempdir().unwrap();
        let the_ghost = the_dir.path().join("nope.toml");
        assert_eq!(existing_config_file(&the_ghost).unwrap(), None);

        let the_real_one = the_dir.path().join("wordbank.toml");
        std::fs::write(&the_real_one, "").unwrap();
        assert_eq!(
            existing_config_file(&the_real_one).unwrap(),
            Some(the_real_one.as_path())
        );
    }

    #[test]
    fn the_one_where_the_hint_only_shows_up_for_network_trouble() {
        assert!(looks_like_a_connection_problem(
            "error sending request for url (https://x.supabase.co/rest/v1/english_words)"
        ));
        assert!(!looks_like_a_connection_problem("401 Unauthorized"));
    }

    #[test]
    fn the_one_where_the_counts_make_it_into_the_tables() {
        let the_stats = DatasetStats::from_records(&[
            Record::new("atom", "원자", Category::Science, Difficulty::Hard),
            Record::new("cell", "세포", Category::Science, Difficulty::Medium),
        ]);
        let (by_category, by_difficulty) = stats_tables(&the_stats);
        let by_category = by_category.to_string();
        assert!(by_category.contains("Science"), "{by_category}");
        assert!(by_category.contains('2'), "{by_category}");
        assert!(by_difficulty.to_string().contains("hard"));
    }
}
