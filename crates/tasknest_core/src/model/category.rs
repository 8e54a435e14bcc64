//! Static category registry.
//!
//! # Responsibility
//! - Own the fixed set of task categories shown by the UI.
//! - Provide read-only lookups used by validation, filtering and display joins.
//!
//! # Invariants
//! - Registry content is compile-time data; there is no create/update/delete.
//! - Category ids are unique and iteration order is display order.

use crate::model::task::Task;
use serde::Serialize;

/// One display category a task can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Stable id stored in `Task::category_id`.
    pub id: &'static str,
    /// Human-readable label.
    pub name: &'static str,
    /// CSS-style hex color used for badges.
    pub color: &'static str,
}

const BUILTIN_CATEGORIES: &[Category] = &[
    Category {
        id: "work",
        name: "Work",
        color: "#7c3aed",
    },
    Category {
        id: "personal",
        name: "Personal",
        color: "#06b6d4",
    },
    Category {
        id: "home",
        name: "Home",
        color: "#f43f5e",
    },
    Category {
        id: "health",
        name: "Health",
        color: "#10b981",
    },
];

/// Read-only lookup over a fixed category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRegistry {
    entries: &'static [Category],
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryRegistry {
    /// Returns the registry with the four built-in categories.
    pub const fn builtin() -> Self {
        Self {
            entries: BUILTIN_CATEGORIES,
        }
    }

    /// Looks up one category by id. Matching is exact.
    pub fn by_id(&self, id: &str) -> Option<&'static Category> {
        self.entries.iter().find(|category| category.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id(id).is_some()
    }

    /// Categories in display order.
    pub fn all(&self) -> &'static [Category] {
        self.entries
    }

    /// Joins a task to its category.
    ///
    /// Returns `None` for dangling references; such tasks are shown without a
    /// category badge rather than rejected.
    pub fn category_for(&self, task: &Task) -> Option<&'static Category> {
        self.by_id(task.category_id.as_str())
    }
}
