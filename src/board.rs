//! The board aggregate: every task, every column, and the left-to-right column order.
//!
//! Tasks and columns refer to each other only by id. Ordering lives in exactly two
//! places, `Board::column_order` and `Column::task_ids`, and nowhere else.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::column::Column;
use crate::fields::Theme;
use crate::task::Task;

/// The unit of persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub tasks: BTreeMap<String, Task>,
    pub columns: BTreeMap<String, Column>,
    pub column_order: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_preferences: Option<UserPreferences>,
}

/// Preferences that travel with the board but never affect the reducer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub filters: FilterPreferences,
}

/// Last-used filter picks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPreferences {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub priorities: Vec<String>,
}

/// A broken referential-integrity rule found by [`Board::audit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("task map key {key} holds task {id}")]
    TaskKeyMismatch { key: String, id: String },
    #[error("column map key {key} holds column {id}")]
    ColumnKeyMismatch { key: String, id: String },
    #[error("column order names missing column {0}")]
    MissingOrderedColumn(String),
    #[error("column {0} appears more than once in the column order")]
    DuplicateOrderedColumn(String),
    #[error("column {0} is not in the column order")]
    UnorderedColumn(String),
    #[error("column {column_id} lists missing task {task_id}")]
    DanglingTaskId { column_id: String, task_id: String },
    #[error("column {column_id} lists task {task_id} owned by column {owner}")]
    ForeignTaskId { column_id: String, task_id: String, owner: String },
    #[error("task {0} is listed more than once")]
    DuplicateTaskId(String),
    #[error("task {task_id} belongs to missing column {column_id}")]
    MissingColumn { task_id: String, column_id: String },
    #[error("task {task_id} is not listed by its column {column_id}")]
    UnlistedTask { task_id: String, column_id: String },
    #[error("task {0} was updated before it was created")]
    UpdatedBeforeCreated(String),
}

impl Board {
    /// The board handed out when nothing usable is persisted: a to-do/doing/done
    /// workflow with no tasks.
    pub fn starter() -> Self {
        let columns = [
            Column::new("column-1", "To Do").with_color("#0079BF"),
            Column::new("column-2", "In Progress").with_color("#FF9D2A"),
            Column::new("column-3", "Done").with_color("#61BD4F"),
        ];
        Board {
            tasks: BTreeMap::new(),
            column_order: columns.iter().map(|c| c.id.clone()).collect(),
            columns: columns.into_iter().map(|c| (c.id.clone(), c)).collect(),
            user_preferences: Some(UserPreferences::default()),
        }
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.get(id)
    }

    /// Columns in display order, skipping order entries with no column.
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> {
        self.column_order.iter().filter_map(|id| self.columns.get(id))
    }

    /// Tasks of a column in stored order, skipping dangling ids.
    pub fn column_tasks<'a>(&'a self, column_id: &str) -> impl Iterator<Item = &'a Task> + 'a {
        self.columns
            .get(column_id)
            .map(|c| c.task_ids.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.tasks.get(id))
    }

    /// Every integrity rule this board breaks; empty for a healthy board.
    pub fn audit(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        for (key, task) in &self.tasks {
            if key != &task.id {
                out.push(Violation::TaskKeyMismatch { key: key.clone(), id: task.id.clone() });
            }
            if task.updated_at < task.created_at {
                out.push(Violation::UpdatedBeforeCreated(key.clone()));
            }
        }
        for (key, column) in &self.columns {
            if key != &column.id {
                out.push(Violation::ColumnKeyMismatch { key: key.clone(), id: column.id.clone() });
            }
        }

        let mut ordered = HashSet::new();
        for id in &self.column_order {
            if !self.columns.contains_key(id) {
                out.push(Violation::MissingOrderedColumn(id.clone()));
            } else if !ordered.insert(id.as_str()) {
                out.push(Violation::DuplicateOrderedColumn(id.clone()));
            }
        }
        for key in self.columns.keys() {
            if !ordered.contains(key.as_str()) {
                out.push(Violation::UnorderedColumn(key.clone()));
            }
        }

        let mut listed = HashSet::new();
        for (column_id, column) in &self.columns {
            for task_id in &column.task_ids {
                match self.tasks.get(task_id) {
                    None => out.push(Violation::DanglingTaskId {
                        column_id: column_id.clone(),
                        task_id: task_id.clone(),
                    }),
                    Some(task) if &task.column_id != column_id => out.push(Violation::ForeignTaskId {
                        column_id: column_id.clone(),
                        task_id: task_id.clone(),
                        owner: task.column_id.clone(),
                    }),
                    Some(_) => {}
                }
                if !listed.insert(task_id.as_str()) {
                    out.push(Violation::DuplicateTaskId(task_id.clone()));
                }
            }
        }
        for (task_id, task) in &self.tasks {
            match self.columns.get(&task.column_id) {
                None => out.push(Violation::MissingColumn {
                    task_id: task_id.clone(),
                    column_id: task.column_id.clone(),
                }),
                Some(column) if column.position_of(task_id).is_none() => {
                    out.push(Violation::UnlistedTask {
                        task_id: task_id.clone(),
                        column_id: task.column_id.clone(),
                    })
                }
                Some(_) => {}
            }
        }
        out
    }

    /// Rebuild a board that satisfies every integrity rule, keeping as much as possible.
    ///
    /// Map keys win over embedded ids, tasks whose column is gone are dropped, column
    /// lists keep the first listing of each task they own, and owned-but-unlisted
    /// tasks are appended to their column.
    pub fn repaired(mut self) -> Board {
        for (key, task) in self.tasks.iter_mut() {
            if &task.id != key {
                task.id = key.clone();
            }
            if task.updated_at < task.created_at {
                task.updated_at = task.created_at;
            }
        }
        for (key, column) in self.columns.iter_mut() {
            if &column.id != key {
                column.id = key.clone();
            }
        }

        let mut seen = HashSet::new();
        let columns = &self.columns;
        self.column_order
            .retain(|id| columns.contains_key(id) && seen.insert(id.clone()));
        for key in self.columns.keys() {
            if !seen.contains(key) {
                self.column_order.push(key.clone());
            }
        }

        self.tasks.retain(|_, task| columns.contains_key(&task.column_id));

        let mut listed: HashSet<String> = HashSet::new();
        for column_id in &self.column_order {
            let Some(column) = self.columns.get_mut(column_id) else { continue };
            let tasks = &self.tasks;
            column.task_ids.retain(|task_id| {
                tasks.get(task_id).is_some_and(|t| &t.column_id == column_id)
                    && listed.insert(task_id.clone())
            });
        }
        for (task_id, task) in &self.tasks {
            if !listed.contains(task_id) {
                if let Some(column) = self.columns.get_mut(&task.column_id) {
                    column.task_ids.push(task_id.clone());
                }
            }
        }
        self
    }
}
