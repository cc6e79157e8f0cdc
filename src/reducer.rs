//! The command reducer: the only code path that changes a board.
//!
//! `apply` takes a board by value and hands back the next board together with an
//! [`Outcome`]. It never performs I/O and never fails: commands naming unknown ids
//! leave the board untouched, and commands the board refuses (a full WIP column, a
//! blank title) come back as [`Outcome::Rejected`] with the board unchanged.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::board::Board;
use crate::column::{normalise_wip, Column};
use crate::fields::Priority;
use crate::ordering;
use crate::task::{ChecklistItem, Comment, Task};
use crate::timestamp::{self, double_option, double_option_millis};

/// A single intended state transition.
///
/// On the wire this is `{"type": "MOVE_TASK", "payload": {...}}` with camelCase
/// payload fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    AddTask(NewTask),
    UpdateTask(TaskPatch),
    DeleteTask {
        task_id: String,
    },
    MoveTask {
        task_id: String,
        source_column_id: String,
        source_index: usize,
        destination_column_id: String,
        destination_index: usize,
    },
    ArchiveTask {
        task_id: String,
    },
    RestoreTask {
        task_id: String,
    },
    AddColumn {
        #[serde(default)]
        id: Option<String>,
        title: String,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        wip: Option<u32>,
    },
    UpdateColumn(ColumnPatch),
    DeleteColumn {
        column_id: String,
    },
    ReorderColumn {
        column_id: String,
        destination_index: usize,
    },
    AddTag {
        task_id: String,
        tag: String,
    },
    RemoveTag {
        task_id: String,
        tag: String,
    },
    AddComment {
        task_id: String,
        text: String,
        author: String,
    },
    DeleteComment {
        task_id: String,
        comment_id: String,
    },
    AddChecklistItem {
        task_id: String,
        text: String,
    },
    ToggleChecklistItem {
        task_id: String,
        item_id: String,
    },
    DeleteChecklistItem {
        task_id: String,
        item_id: String,
    },
    ImportData {
        data: Box<Board>,
    },
}

impl Command {
    /// Wire tag, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddTask(_) => "ADD_TASK",
            Command::UpdateTask(_) => "UPDATE_TASK",
            Command::DeleteTask { .. } => "DELETE_TASK",
            Command::MoveTask { .. } => "MOVE_TASK",
            Command::ArchiveTask { .. } => "ARCHIVE_TASK",
            Command::RestoreTask { .. } => "RESTORE_TASK",
            Command::AddColumn { .. } => "ADD_COLUMN",
            Command::UpdateColumn(_) => "UPDATE_COLUMN",
            Command::DeleteColumn { .. } => "DELETE_COLUMN",
            Command::ReorderColumn { .. } => "REORDER_COLUMN",
            Command::AddTag { .. } => "ADD_TAG",
            Command::RemoveTag { .. } => "REMOVE_TAG",
            Command::AddComment { .. } => "ADD_COMMENT",
            Command::DeleteComment { .. } => "DELETE_COMMENT",
            Command::AddChecklistItem { .. } => "ADD_CHECKLIST_ITEM",
            Command::ToggleChecklistItem { .. } => "TOGGLE_CHECKLIST_ITEM",
            Command::DeleteChecklistItem { .. } => "DELETE_CHECKLIST_ITEM",
            Command::ImportData { .. } => "IMPORT_DATA",
        }
    }
}

/// Payload of `ADD_TASK`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub column_id: String,
    pub content: String,
    /// Caller-chosen id; a fresh UUID otherwise.
    #[serde(default)]
    pub id: Option<String>,
    /// Slot in the column; appended when absent.
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, with = "timestamp::option_millis")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

impl NewTask {
    pub fn new(column_id: impl Into<String>, content: impl Into<String>) -> Self {
        NewTask {
            column_id: column_id.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Payload of `UPDATE_TASK`. `None` keeps a field; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub task_id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub priority: Option<Option<Priority>>,
    #[serde(default, deserialize_with = "double_option_millis")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_image: Option<Option<String>>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn new(task_id: impl Into<String>) -> Self {
        TaskPatch { task_id: task_id.into(), ..Default::default() }
    }
}

/// Payload of `UPDATE_COLUMN`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPatch {
    pub column_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub color: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub wip: Option<Option<u32>>,
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Unknown id, or the command would not change anything.
    Unchanged,
    Rejected(Rejection),
}

impl Outcome {
    pub fn changed(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Why a command was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("column \"{title}\" is at its work-in-progress limit of {limit}")]
    WipLimitReached { column_id: String, title: String, limit: u32 },
    #[error("task text cannot be blank")]
    BlankContent,
    #[error("column title cannot be blank")]
    BlankTitle,
}

/// The board after a command, and what the command did to it.
#[derive(Debug, Clone)]
pub struct Transition {
    pub board: Board,
    pub outcome: Outcome,
}

/// Apply `command` at the current time.
pub fn apply(board: Board, command: Command) -> Transition {
    apply_at(board, command, Utc::now())
}

/// Apply `command` with an explicit clock.
pub fn apply_at(mut board: Board, command: Command, now: DateTime<Utc>) -> Transition {
    let name = command.name();
    let outcome = reduce(&mut board, command, timestamp::truncate(now));
    match &outcome {
        Outcome::Applied => debug!(command = name, "applied"),
        Outcome::Unchanged => debug!(command = name, "no effect"),
        Outcome::Rejected(why) => info!(command = name, reason = %why, "rejected"),
    }
    Transition { board, outcome }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Keep the first occurrence of each tag.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Run `f` against a task, bumping `updated_at` when it reports a change.
fn edit_task(
    board: &mut Board,
    task_id: &str,
    now: DateTime<Utc>,
    f: impl FnOnce(&mut Task) -> Outcome,
) -> Outcome {
    let Some(task) = board.tasks.get_mut(task_id) else {
        return Outcome::Unchanged;
    };
    let outcome = f(task);
    if outcome.changed() {
        task.touch(now);
    }
    outcome
}

// Every arm checks everything it needs before its first write, so a non-applied
// outcome always leaves the board exactly as it came in.
fn reduce(board: &mut Board, command: Command, now: DateTime<Utc>) -> Outcome {
    match command {
        Command::AddTask(new) => add_task(board, new, now),
        Command::UpdateTask(patch) => update_task(board, patch, now),
        Command::DeleteTask { task_id } => {
            if board.tasks.remove(&task_id).is_none() {
                return Outcome::Unchanged;
            }
            for column in board.columns.values_mut() {
                column.task_ids.retain(|id| id != &task_id);
            }
            Outcome::Applied
        }
        Command::MoveTask {
            task_id,
            source_column_id,
            source_index,
            destination_column_id,
            destination_index,
        } => move_task(
            board,
            &task_id,
            &source_column_id,
            source_index,
            &destination_column_id,
            destination_index,
            now,
        ),
        Command::ArchiveTask { task_id } => set_archived(board, &task_id, true, now),
        Command::RestoreTask { task_id } => set_archived(board, &task_id, false, now),
        Command::AddColumn { id, title, color, wip } => {
            if is_blank(&title) {
                return Outcome::Rejected(Rejection::BlankTitle);
            }
            let id = id.unwrap_or_else(new_id);
            if board.columns.contains_key(&id) {
                return Outcome::Unchanged;
            }
            let column = Column {
                id: id.clone(),
                title,
                task_ids: Vec::new(),
                color,
                wip: normalise_wip(wip),
            };
            board.columns.insert(id.clone(), column);
            board.column_order.push(id);
            Outcome::Applied
        }
        Command::UpdateColumn(patch) => {
            let Some(column) = board.columns.get_mut(&patch.column_id) else {
                return Outcome::Unchanged;
            };
            if patch.title.as_deref().is_some_and(is_blank) {
                return Outcome::Rejected(Rejection::BlankTitle);
            }
            if let Some(title) = patch.title {
                column.title = title;
            }
            if let Some(color) = patch.color {
                column.color = color;
            }
            if let Some(wip) = patch.wip {
                column.wip = normalise_wip(wip);
            }
            Outcome::Applied
        }
        Command::DeleteColumn { column_id } => {
            let Some(column) = board.columns.remove(&column_id) else {
                return Outcome::Unchanged;
            };
            board.column_order.retain(|id| id != &column_id);
            for task_id in &column.task_ids {
                board.tasks.remove(task_id);
            }
            board.tasks.retain(|_, t| t.column_id != column_id);
            Outcome::Applied
        }
        Command::ReorderColumn { column_id, destination_index } => {
            let Some(from) = board.column_order.iter().position(|id| id == &column_id) else {
                return Outcome::Unchanged;
            };
            if destination_index >= board.column_order.len() || from == destination_index {
                return Outcome::Unchanged;
            }
            ordering::move_within(&mut board.column_order, from, destination_index);
            Outcome::Applied
        }
        Command::AddTag { task_id, tag } => edit_task(board, &task_id, now, |task| {
            let tag = tag.trim();
            if tag.is_empty() || task.has_tag(tag) {
                return Outcome::Unchanged;
            }
            task.tags.push(tag.to_string());
            Outcome::Applied
        }),
        Command::RemoveTag { task_id, tag } => edit_task(board, &task_id, now, |task| {
            let before = task.tags.len();
            task.tags.retain(|t| t != tag.trim());
            if task.tags.len() == before {
                Outcome::Unchanged
            } else {
                Outcome::Applied
            }
        }),
        Command::AddComment { task_id, text, author } => edit_task(board, &task_id, now, |task| {
            if is_blank(&text) {
                return Outcome::Rejected(Rejection::BlankContent);
            }
            task.comments.push(Comment { id: new_id(), text, author, created_at: now });
            Outcome::Applied
        }),
        Command::DeleteComment { task_id, comment_id } => edit_task(board, &task_id, now, |task| {
            match task.comments.iter().position(|c| c.id == comment_id) {
                Some(i) => {
                    task.comments.remove(i);
                    Outcome::Applied
                }
                None => Outcome::Unchanged,
            }
        }),
        Command::AddChecklistItem { task_id, text } => edit_task(board, &task_id, now, |task| {
            if is_blank(&text) {
                return Outcome::Rejected(Rejection::BlankContent);
            }
            task.checklist.push(ChecklistItem { id: new_id(), text, is_complete: false });
            Outcome::Applied
        }),
        Command::ToggleChecklistItem { task_id, item_id } => edit_task(board, &task_id, now, |task| {
            match task.checklist.iter_mut().find(|i| i.id == item_id) {
                Some(item) => {
                    item.is_complete = !item.is_complete;
                    Outcome::Applied
                }
                None => Outcome::Unchanged,
            }
        }),
        Command::DeleteChecklistItem { task_id, item_id } => edit_task(board, &task_id, now, |task| {
            let before = task.checklist.len();
            task.checklist.retain(|i| i.id != item_id);
            if task.checklist.len() == before {
                Outcome::Unchanged
            } else {
                Outcome::Applied
            }
        }),
        Command::ImportData { data } => {
            let data = *data;
            let violations = data.audit();
            for v in &violations {
                warn!(violation = %v, "repairing imported board");
            }
            *board = if violations.is_empty() { data } else { data.repaired() };
            Outcome::Applied
        }
    }
}

fn add_task(board: &mut Board, new: NewTask, now: DateTime<Utc>) -> Outcome {
    let id = new.id.unwrap_or_else(new_id);
    if board.tasks.contains_key(&id) {
        return Outcome::Unchanged;
    }
    let Some(column) = board.columns.get_mut(&new.column_id) else {
        return Outcome::Unchanged;
    };
    if is_blank(&new.content) {
        return Outcome::Rejected(Rejection::BlankContent);
    }

    let mut task = Task::new(id.clone(), new.column_id, new.content, now);
    task.description = new.description;
    task.priority = new.priority;
    task.due_date = new.due_date.map(timestamp::truncate);
    task.tags = dedup_tags(new.tags);
    task.assigned_to = new.assigned_to;
    task.cover_image = new.cover_image;

    ordering::insert_at(&mut column.task_ids, id.clone(), new.index);
    board.tasks.insert(id, task);
    Outcome::Applied
}

fn update_task(board: &mut Board, patch: TaskPatch, now: DateTime<Utc>) -> Outcome {
    edit_task(board, &patch.task_id, now, |task| {
        if patch.content.as_deref().is_some_and(is_blank) {
            return Outcome::Rejected(Rejection::BlankContent);
        }
        if let Some(content) = patch.content {
            task.content = content;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due) = patch.due_date {
            task.due_date = due.map(timestamp::truncate);
        }
        if let Some(tags) = patch.tags {
            task.tags = dedup_tags(tags);
        }
        if let Some(assignee) = patch.assigned_to {
            task.assigned_to = assignee;
        }
        if let Some(cover) = patch.cover_image {
            task.cover_image = cover;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        Outcome::Applied
    })
}

fn set_archived(board: &mut Board, task_id: &str, archived: bool, now: DateTime<Utc>) -> Outcome {
    edit_task(board, task_id, now, |task| {
        if task.is_archived == archived {
            return Outcome::Unchanged;
        }
        task.is_archived = archived;
        Outcome::Applied
    })
}

fn move_task(
    board: &mut Board,
    task_id: &str,
    source_id: &str,
    source_index: usize,
    dest_id: &str,
    dest_index: usize,
    now: DateTime<Utc>,
) -> Outcome {
    if source_id == dest_id && source_index == dest_index {
        return Outcome::Unchanged;
    }
    if !board.tasks.contains_key(task_id) || !board.columns.contains_key(dest_id) {
        return Outcome::Unchanged;
    }
    let Some(from) = board
        .columns
        .get(source_id)
        .and_then(|c| ordering::locate(&c.task_ids, task_id, source_index))
    else {
        return Outcome::Unchanged;
    };

    if source_id == dest_id {
        let Some(column) = board.columns.get_mut(source_id) else {
            return Outcome::Unchanged;
        };
        if !ordering::move_within(&mut column.task_ids, from, dest_index) {
            return Outcome::Unchanged;
        }
    } else {
        let Some(mut dest) = board.columns.remove(dest_id) else {
            return Outcome::Unchanged;
        };
        if let Some(limit) = dest.wip.filter(|_| dest.is_full()) {
            let rejection = Rejection::WipLimitReached {
                column_id: dest.id.clone(),
                title: dest.title.clone(),
                limit,
            };
            board.columns.insert(dest_id.to_string(), dest);
            return Outcome::Rejected(rejection);
        }
        if let Some(source) = board.columns.get_mut(source_id) {
            ordering::move_across(&mut source.task_ids, from, &mut dest.task_ids, dest_index);
        }
        board.columns.insert(dest_id.to_string(), dest);
    }

    if let Some(task) = board.tasks.get_mut(task_id) {
        task.column_id = dest_id.to_string();
        task.touch(now);
    }
    Outcome::Applied
}
