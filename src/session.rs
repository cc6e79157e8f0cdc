//! A live board bound to its store.
//!
//! Commands run one at a time: reduce, swap the new board in, then persist. A failed
//! write is reported but the in-memory board keeps the change.

use tracing::{error, info};

use crate::board::Board;
use crate::db::{export_board, import_board, Persistence, Store};
use crate::error::Result;
use crate::reducer::{self, Command, Outcome};

pub struct Session<S: Store> {
    board: Board,
    persistence: Persistence<S>,
}

impl<S: Store> Session<S> {
    /// Load whatever the store holds, or the starter board.
    pub fn open(store: S) -> Self {
        let persistence = Persistence::new(store);
        let board = persistence.load();
        Session { board, persistence }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    /// Apply `command`; saves only when the board actually changed.
    ///
    /// `Err` means the write failed. The board has still moved on.
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        let board = std::mem::take(&mut self.board);
        let transition = reducer::apply(board, command);
        self.board = transition.board;
        if transition.outcome.changed() {
            if let Err(e) = self.persistence.save(&self.board) {
                error!(error = %e, "failed to persist board");
                return Err(e);
            }
        }
        Ok(transition.outcome)
    }

    /// Replace the whole board with an exported snapshot.
    ///
    /// Unparseable input leaves the current board untouched.
    pub fn import(&mut self, data: &[u8]) -> Result<Outcome> {
        let board = import_board(data)?;
        info!(tasks = board.tasks.len(), columns = board.columns.len(), "importing board");
        self.dispatch(Command::ImportData { data: Box::new(board) })
    }

    pub fn export(&self) -> Result<Vec<u8>> {
        export_board(&self.board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::error::Error;
    use crate::reducer::NewTask;

    /// Accepts reads but refuses every write.
    struct ReadOnly;

    impl Store for ReadOnly {
        fn read(&self) -> Result<Option<String>> {
            Ok(None)
        }

        fn write(&mut self, _data: &str) -> Result<()> {
            Err(Error::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only")))
        }
    }

    #[test]
    fn test_dispatch_persists_changes() {
        let mut s = Session::open(MemoryStore::new());
        let outcome = s.dispatch(Command::AddTask(NewTask::new("column-1", "write docs"))).unwrap();
        assert_eq!(outcome, Outcome::Applied);
        let saved = Persistence::new(s.store().clone()).load();
        assert_eq!(&saved, s.board());
    }

    #[test]
    fn test_noop_does_not_write() {
        let mut s = Session::open(MemoryStore::new());
        let outcome = s.dispatch(Command::DeleteTask { task_id: "missing".into() }).unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(s.store().read().unwrap(), None);
    }

    #[test]
    fn test_write_failure_keeps_new_state() {
        let mut s = Session::open(ReadOnly);
        let result = s.dispatch(Command::AddTask(NewTask::new("column-1", "x")));
        assert!(result.is_err());
        assert_eq!(s.board().tasks.len(), 1);
    }

    #[test]
    fn test_import_failure_leaves_board() {
        let mut s = Session::open(MemoryStore::new());
        s.dispatch(Command::AddTask(NewTask::new("column-1", "keep"))).unwrap();
        let before = s.board().clone();
        assert!(s.import(b"not json").is_err());
        assert_eq!(s.board(), &before);
    }

    #[test]
    fn test_raw_import_command_is_repaired_before_saving() {
        let mut broken = Board::starter();
        let mut s = Session::open(MemoryStore::new());
        s.dispatch(Command::AddTask(NewTask { id: Some("t1".into()), ..NewTask::new("column-1", "x") }))
            .unwrap();
        let mut task = s.board().tasks["t1"].clone();
        task.column_id = "ghost".into();
        broken.tasks.insert("t1".into(), task);
        broken.columns.get_mut("column-1").unwrap().task_ids = vec!["t1".into(), "nope".into()];

        let outcome = s.dispatch(Command::ImportData { data: Box::new(broken) }).unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert!(s.board().audit().is_empty());
        let saved = Persistence::new(s.store().clone()).load();
        assert_eq!(&saved, s.board());
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut s = Session::open(MemoryStore::new());
        s.dispatch(Command::AddTask(NewTask::new("column-2", "ship"))).unwrap();
        let snapshot = s.export().unwrap();

        let mut other = Session::open(MemoryStore::new());
        assert_eq!(other.import(&snapshot).unwrap(), Outcome::Applied);
        assert_eq!(other.board(), s.board());
        // Importing the same snapshot again lands on the same board.
        other.import(&snapshot).unwrap();
        assert_eq!(other.board(), s.board());
    }
}
