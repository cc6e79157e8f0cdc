//! Data directory discovery and `config.toml` settings.
//!
//! The board lives in `<data dir>/board.json`. The data directory comes from `--dir`
//! (or `TASKBOARD_DIR`), falling back to `~/.taskboard`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::{export_file_name, STATE_FILE};
use crate::error::Result;

pub const CONFIG_FILE: &str = "config.toml";
pub const DIR_ENV: &str = "TASKBOARD_DIR";

/// Optional settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Author recorded on comments when none is given.
    #[serde(default = "default_author")]
    pub author: String,

    /// Where exports land; the current directory otherwise.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            author: default_author(),
            export_dir: None,
        }
    }
}

fn default_author() -> String {
    std::env::var("USER").unwrap_or_else(|_| "anonymous".to_string())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub settings: Settings,
}

impl Config {
    /// Resolve the data directory and read its `config.toml`, if present.
    pub fn resolve(dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = dir.unwrap_or_else(default_data_dir);
        let settings = load_settings(&data_dir)?;
        debug!(data_dir = %data_dir.display(), "configuration resolved");
        Ok(Config { data_dir, settings })
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    /// Export destination for a snapshot taken on `date`.
    pub fn export_path(&self, date: NaiveDate) -> PathBuf {
        let dir = self.settings.export_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        dir.join(export_file_name(date))
    }
}

/// `~/.taskboard`, or `./.taskboard` when HOME is unset.
pub fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".taskboard")
}

fn load_settings(data_dir: &Path) -> Result<Settings> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(&path)?;
    Ok(toml::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::resolve(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(cfg.state_path(), dir.path().join("board.json"));
        assert_eq!(cfg.settings.export_dir, None);
        let d = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(cfg.export_path(d), PathBuf::from(".").join("kanban-backup-2024-05-01.json"));
    }

    #[test]
    fn test_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "author = \"ana\"\nexport_dir = \"/tmp/exports\"\n",
        )
        .unwrap();
        let cfg = Config::resolve(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(cfg.settings.author, "ana");
        assert_eq!(cfg.settings.export_dir, Some(PathBuf::from("/tmp/exports")));
    }

    #[test]
    fn test_bad_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "author = [").unwrap();
        assert!(Config::resolve(Some(dir.path().to_path_buf())).is_err());
    }
}
