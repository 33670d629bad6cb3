//! Regrade - audit stored place grades against the current rules
//!
//! Replays a journal, re-grades the latest snapshot of every place and
//! prints the places whose stored grade differs.
//!
//! Usage:
//!   regrade --journal data/journal.jsonl
//!   regrade --config config/dev.toml --json

use access_map::infra::Config;
use access_map::io::read_entries;
use access_map::services::regrade::{find_changes, latest_places};
use clap::Parser;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Regrade - find places whose stored grade drifted from the rules
#[derive(Parser, Debug)]
#[command(name = "regrade", version, about, long_about = None)]
struct Args {
    /// Path to TOML configuration file, used for the journal location
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,

    /// Journal file to read (overrides journal.file from config)
    #[arg(short, long)]
    journal: Option<String>,

    /// Print changes as one JSON object per line
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let journal_file = match args.journal {
        Some(path) => path,
        None => Config::load_from_path(&args.config).journal_file().to_string(),
    };

    let places = latest_places(read_entries(&journal_file)?);
    let changes = find_changes(&places);

    info!(journal = %journal_file, places = %places.len(), changed = %changes.len(), "regrade_complete");

    for change in &changes {
        if args.json {
            println!("{}", serde_json::to_string(change)?);
        } else {
            println!(
                "{}\t{}\t{} -> {}\t{}",
                change.place_id, change.name, change.stored, change.current, change.comment
            );
        }
    }

    if !args.json {
        println!("{} of {} places changed grade", changes.len(), places.len());
    }
    Ok(())
}
