use std::path::PathBuf;

use clap::Parser;

use crate::cmd::{self, Commands};
use crate::config::{Config, DIR_ENV};
use crate::error::Result;

/// File-backed kanban board CLI.
/// The board is stored in <dir>/board.json, defaulting to ~/.taskboard.
#[derive(Parser)]
#[command(name = "tb", version, about = "Kanban task board")]
pub struct Cli {
    /// Data directory holding board.json and config.toml.
    #[arg(long, global = true, env = DIR_ENV)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = Config::resolve(self.dir)?;
        cmd::run(self.command, &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_global_dir() {
        let cli = Cli::try_parse_from(["tb", "list", "--dir", "/tmp/x", "--tag", "ui"]).unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Commands::List { tag: Some(_), .. }));
    }
}
