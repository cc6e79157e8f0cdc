//! Column data structure.

use serde::{Deserialize, Serialize};

/// A named, ordered container of task ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub task_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Work-in-progress limit; `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wip: Option<u32>,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Column {
            id: id.into(),
            title: title.into(),
            task_ids: Vec::new(),
            color: None,
            wip: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// True when one more task would exceed the WIP limit.
    pub fn is_full(&self) -> bool {
        self.wip.is_some_and(|limit| self.task_ids.len() >= limit as usize)
    }

    pub fn position_of(&self, task_id: &str) -> Option<usize> {
        self.task_ids.iter().position(|id| id == task_id)
    }
}

/// A zero limit is how clients spell "no limit".
pub fn normalise_wip(wip: Option<u32>) -> Option<u32> {
    wip.filter(|&n| n > 0)
}
