//! tb - kanban task board CLI
//!
//! Columns, tasks, tags, comments and checklists in a single JSON file.
//!
//! ```bash
//! tb add "Fix login bug" --priority high --due tomorrow --tag api
//! tb move "Fix login bug" "In Progress"
//! tb list --tag api --sort priority
//! tb export
//! ```
//!
//! Data lives in `~/.taskboard/board.json` unless `--dir` or `TASKBOARD_DIR` says otherwise.

use clap::Parser;
use taskboard::cli::Cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    // Tracing is opt-in via RUST_LOG and goes to stderr.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    if let Err(err) = cli.run() {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
}
