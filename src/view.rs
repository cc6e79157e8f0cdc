//! Derived views: the filtered, sorted task lists shown per column.
//!
//! Nothing here mutates the board. Due-date buckets compare local calendar dates, and
//! the caller supplies "today" so results are reproducible.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::column::Column;
use crate::fields::{AssigneeFilter, DueFilter, Priority, SortDirection, SortKey};
use crate::task::Task;
use crate::timestamp::local_date;

/// Filter and sort parameters for a view. All predicates are ANDed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Query {
    /// Case-insensitive substring over content, description and tags.
    pub text: String,
    pub priority: Option<Priority>,
    pub tag: Option<String>,
    pub assignee: AssigneeFilter,
    pub show_completed: bool,
    /// When false, tasks that have an assignee are hidden.
    pub show_assigned: bool,
    pub due: Option<DueFilter>,
    pub sort: Option<SortKey>,
    pub direction: SortDirection,
    pub include_archived: bool,
}

impl Default for Query {
    fn default() -> Self {
        Query {
            text: String::new(),
            priority: None,
            tag: None,
            assignee: AssigneeFilter::Any,
            show_completed: true,
            show_assigned: true,
            due: None,
            sort: None,
            direction: SortDirection::Asc,
            include_archived: false,
        }
    }
}

impl Query {
    /// Whether anything differs from the show-everything default.
    pub fn is_active(&self) -> bool {
        *self != Query::default()
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if task.is_archived && !self.include_archived {
            return false;
        }
        if !self.matches_text(task) {
            return false;
        }
        if self.priority.is_some() && task.priority != self.priority {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !task.has_tag(tag) {
                return false;
            }
        }
        if !self.assignee.matches(task.assigned_to.as_deref()) {
            return false;
        }
        if !self.show_completed && task.completed {
            return false;
        }
        if !self.show_assigned && task.assigned_to.as_deref().is_some_and(|a| !a.is_empty()) {
            return false;
        }
        match self.due {
            None => true,
            Some(bucket) => task
                .due_date
                .is_some_and(|due| in_bucket(bucket, local_date(due), today)),
        }
    }

    fn matches_text(&self, task: &Task) -> bool {
        let needle = self.text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        task.content.to_lowercase().contains(&needle)
            || task
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
            || task.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    fn compare(&self, key: SortKey, a: &Task, b: &Task) -> Ordering {
        let ord = match key {
            SortKey::Priority => Priority::rank(a.priority).cmp(&Priority::rank(b.priority)),
            SortKey::DueDate => due_key(a).cmp(&due_key(b)),
            SortKey::Title => a.content.to_lowercase().cmp(&b.content.to_lowercase()),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Tasks without a due date sort as the latest.
fn due_key(task: &Task) -> i64 {
    task.due_date.map_or(i64::MAX, |d| d.timestamp_millis())
}

fn in_bucket(bucket: DueFilter, due: NaiveDate, today: NaiveDate) -> bool {
    match bucket {
        DueFilter::Today => due == today,
        DueFilter::Week => due >= today && due <= today + Duration::days(7),
        DueFilter::Overdue => due < today,
    }
}

/// Apply `query` to `tasks`, preserving input order unless a sort key is set.
///
/// The sort is stable, so ties keep their original relative order.
pub fn filter_tasks<'a, I>(tasks: I, query: &Query, today: NaiveDate) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut out: Vec<&Task> = tasks.into_iter().filter(|t| query.matches(t, today)).collect();
    if let Some(key) = query.sort {
        out.sort_by(|a, b| query.compare(key, a, b));
    }
    out
}

/// Visible tasks of one column, starting from the column's stored order.
pub fn column_view<'a>(board: &'a Board, column_id: &str, query: &Query, today: NaiveDate) -> Vec<&'a Task> {
    filter_tasks(board.column_tasks(column_id), query, today)
}

/// One column as displayed.
#[derive(Debug, Clone)]
pub struct ColumnView<'a> {
    pub column: &'a Column,
    pub tasks: Vec<&'a Task>,
    /// Stored task count, archived included; this is what the WIP limit counts.
    pub total: usize,
}

/// Every column in display order with its visible tasks.
pub fn board_view<'a>(board: &'a Board, query: &Query, today: NaiveDate) -> Vec<ColumnView<'a>> {
    board
        .ordered_columns()
        .map(|column| ColumnView {
            column,
            tasks: column_view(board, &column.id, query, today),
            total: column.task_ids.len(),
        })
        .collect()
}

/// Local calendar date right now.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Distinct tags across the board, sorted.
pub fn all_tags(board: &Board) -> Vec<String> {
    board
        .tasks
        .values()
        .flat_map(|t| t.tags.iter())
        .filter(|t| !t.is_empty())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct assignees across the board, sorted.
pub fn all_assignees(board: &Board) -> Vec<String> {
    board
        .tasks
        .values()
        .filter_map(|t| t.assigned_to.clone())
        .filter(|a| !a.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
