//! Enumerations and field types for the board.
//!
//! This module defines the small structured values used to categorise tasks and to
//! drive the derived views: priorities, themes, due-date buckets and sort options.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Priority classification for task importance.
///
/// Older board files used Portuguese labels, so those are accepted on input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    #[serde(alias = "baixa")]
    Low,
    #[serde(alias = "média", alias = "media")]
    Medium,
    #[serde(alias = "alta")]
    High,
}

impl Priority {
    /// Sort weight; tasks without a priority rank 0.
    pub fn rank(p: Option<Priority>) -> u8 {
        match p {
            Some(Priority::High) => 3,
            Some(Priority::Medium) => 2,
            Some(Priority::Low) => 1,
            None => 0,
        }
    }
}

/// Colour scheme preference stored alongside the board.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Filtering options for tasks based on due dates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DueFilter {
    Today,
    /// Today through seven days from now, inclusive.
    Week,
    Overdue,
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Priority,
    #[value(alias = "due")]
    DueDate,
    Title,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Assignee restriction for the view pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AssigneeFilter {
    #[default]
    Any,
    /// Only tasks nobody is assigned to.
    Unassigned,
    Named(String),
}

impl AssigneeFilter {
    pub fn matches(&self, assignee: Option<&str>) -> bool {
        match self {
            AssigneeFilter::Any => true,
            AssigneeFilter::Unassigned => assignee.map_or(true, str::is_empty),
            AssigneeFilter::Named(name) => assignee == Some(name.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_accepts_legacy_labels() {
        let p: Priority = serde_json::from_str("\"alta\"").unwrap();
        assert_eq!(p, Priority::High);
        let p: Priority = serde_json::from_str("\"média\"").unwrap();
        assert_eq!(p, Priority::Medium);
        let p: Priority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(p, Priority::Low);
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), "\"medium\"");
    }

    #[test]
    fn test_priority_rank() {
        assert_eq!(Priority::rank(Some(Priority::High)), 3);
        assert_eq!(Priority::rank(Some(Priority::Medium)), 2);
        assert_eq!(Priority::rank(Some(Priority::Low)), 1);
        assert_eq!(Priority::rank(None), 0);
    }

    #[test]
    fn test_assignee_filter() {
        assert!(AssigneeFilter::Any.matches(None));
        assert!(AssigneeFilter::Unassigned.matches(None));
        assert!(AssigneeFilter::Unassigned.matches(Some("")));
        assert!(!AssigneeFilter::Unassigned.matches(Some("ana")));
        let named = AssigneeFilter::Named("ana".into());
        assert!(named.matches(Some("ana")));
        assert!(!named.matches(Some("bruno")));
        assert!(!named.matches(None));
    }
}
