//! Persistence: the durable board slot, export snapshots and imports.
//!
//! The persisted file, the export file and the import input are one format: the
//! board serialized as JSON with every timestamp as epoch milliseconds.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::board::Board;
use crate::error::{Error, Result};

/// File name of the persisted board inside the data directory.
pub const STATE_FILE: &str = "board.json";

/// A single named durable slot holding the serialized board.
pub trait Store {
    /// The stored text, or `None` if nothing has been written yet.
    fn read(&self) -> Result<Option<String>>;
    /// Replace the stored text.
    fn write(&mut self, data: &str) -> Result<()>;
}

/// A slot backed by one JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for FileStore {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Atomic-ish write via temp + rename.
    fn write(&mut self, data: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.sync_all()?;
        drop(f);
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// A slot held in memory; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_contents(data: impl Into<String>) -> Self {
        MemoryStore { slot: Some(data.into()) }
    }
}

impl Store for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.slot.clone())
    }

    fn write(&mut self, data: &str) -> Result<()> {
        self.slot = Some(data.to_string());
        Ok(())
    }
}

/// Loads and saves the board through a [`Store`] handle.
#[derive(Debug)]
pub struct Persistence<S: Store> {
    store: S,
}

impl<S: Store> Persistence<S> {
    pub fn new(store: S) -> Self {
        Persistence { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the slot, falling back to the starter board when it is empty or unreadable.
    pub fn load(&self) -> Board {
        let data = match self.store.read() {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!("no saved board, starting fresh");
                return Board::starter();
            }
            Err(e) => {
                warn!(error = %e, "error reading board, starting fresh");
                return Board::starter();
            }
        };
        match parse_board(data.as_bytes()) {
            Ok(board) => install(board),
            Err(e) => {
                warn!(error = %e, "error parsing board, starting fresh");
                Board::starter()
            }
        }
    }

    /// Overwrite the slot with `board`.
    pub fn save(&mut self, board: &Board) -> Result<()> {
        let data = serde_json::to_string_pretty(board)?;
        self.store.write(&data)?;
        debug!(tasks = board.tasks.len(), columns = board.columns.len(), "board saved");
        Ok(())
    }
}

/// Parse board JSON without any integrity checks.
pub fn parse_board(data: &[u8]) -> Result<Board> {
    serde_json::from_slice(data).map_err(|e| Error::Format(e.to_string()))
}

/// Log every integrity violation and return the repaired board.
fn install(board: Board) -> Board {
    let violations = board.audit();
    if violations.is_empty() {
        return board;
    }
    for v in &violations {
        warn!(violation = %v, "repairing board");
    }
    board.repaired()
}

/// Serialize `board` as a downloadable snapshot.
pub fn export_board(board: &Board) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(board)?)
}

/// Parse an exported snapshot into a board ready to install.
///
/// Structurally malformed input is an [`Error::Format`]. Referential problems are
/// repaired rather than rejected; see [`Board::repaired`].
pub fn import_board(data: &[u8]) -> Result<Board> {
    parse_board(data).map(install)
}

/// `kanban-backup-YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("kanban-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Copy the board file into a sibling `backup/` directory with a timestamped name.
pub fn create_backup(db_path: &Path) -> Result<PathBuf> {
    if !db_path.exists() {
        return Err(Error::Io(std::io::Error::new(
            ErrorKind::NotFound,
            format!("board file {} does not exist", db_path.display()),
        )));
    }
    let parent_dir = db_path.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent_dir.join("backup");
    fs::create_dir_all(&backup_dir)?;

    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let file_name = db_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(STATE_FILE);
    let backup_path = backup_dir.join(format!("{stamp}_{file_name}"));
    fs::copy(db_path, &backup_path)?;
    Ok(backup_path)
}
