//! Visible-list derivation for task filters.
//!
//! # Responsibility
//! - Parse status/category filter criteria from UI values.
//! - Derive the visible, order-preserving subset of tasks.
//! - Summarize task counts for the sidebar.
//!
//! # Invariants
//! - Filtering is stable: surviving tasks keep their source order.
//! - A task is visible iff it passes both status and category predicates.

use crate::model::task::{Task, TaskStatus};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Value both filters use for "no restriction".
pub const FILTER_ALL: &str = "all";

/// Error for filter text the UI should never send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterParseError {
    UnknownStatus(String),
    EmptyCategory,
}

impl Display for FilterParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStatus(value) => write!(
                f,
                "unknown status filter `{value}`; expected all|pending|completed"
            ),
            Self::EmptyCategory => write!(f, "category filter cannot be empty"),
        }
    }
}

impl Error for FilterParseError {}

/// Status predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = FilterParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized == FILTER_ALL {
            return Ok(Self::All);
        }
        TaskStatus::parse(normalized.as_str())
            .map(Self::Only)
            .ok_or(FilterParseError::UnknownStatus(normalized))
    }
}

/// Category predicate.
///
/// Category ids are not checked against the registry here; filtering by an
/// unknown id simply yields an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, category_id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == category_id,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = FilterParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FilterParseError::EmptyCategory);
        }
        // Ids keep their case; only the `all` keyword is case-insensitive.
        if trimmed.eq_ignore_ascii_case(FILTER_ALL) {
            return Ok(Self::All);
        }
        Ok(Self::Only(trimmed.to_string()))
    }
}

/// Current filter criteria (status, category).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub category: CategoryFilter,
}

impl TaskFilter {
    pub fn new(status: StatusFilter, category: CategoryFilter) -> Self {
        Self { status, category }
    }

    /// Parses both criteria from their UI string form.
    pub fn parse(status: &str, category: &str) -> Result<Self, FilterParseError> {
        Ok(Self {
            status: status.parse()?,
            category: category.parse()?,
        })
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task.status) && self.category.matches(task.category_id.as_str())
    }

    /// Whether any predicate narrows the list.
    pub fn is_active(&self) -> bool {
        self.status != StatusFilter::All || self.category != CategoryFilter::All
    }
}

/// Returns tasks passing `filter`, in source order.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

/// Per-status task counts over an unfiltered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.is_completed()).count();
        Self {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
        }
    }
}
