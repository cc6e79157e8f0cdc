//! Task data structure and its embedded sub-entities.
//!
//! This module defines the `Task` struct that represents a single card on the board,
//! together with the checklist items and comments it carries inline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::Priority;
use crate::timestamp;

/// A work item living in exactly one column.
///
/// Position within the column is not stored here; the owning column's `task_ids`
/// list is authoritative for ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub column_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, with = "timestamp::option_millis", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "timestamp::millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp::millis")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A fresh task with every collection empty and both timestamps set to `now`.
    pub fn new(id: String, column_id: String, content: String, now: DateTime<Utc>) -> Self {
        Task {
            id,
            column_id,
            content,
            description: None,
            priority: None,
            due_date: None,
            tags: Vec::new(),
            attachments: Vec::new(),
            checklist: Vec::new(),
            comments: Vec::new(),
            assigned_to: None,
            cover_image: None,
            is_archived: false,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Record a modification, keeping `updated_at >= created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Completed and total checklist items.
    pub fn checklist_progress(&self) -> (usize, usize) {
        let done = self.checklist.iter().filter(|i| i.is_complete).count();
        (done, self.checklist.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_complete: bool,
}

/// An entry in a task's comment log. Text is never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: String,
    #[serde(with = "timestamp::millis")]
    pub created_at: DateTime<Utc>,
}
