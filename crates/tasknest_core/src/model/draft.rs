//! Task draft input and admission validation.
//!
//! # Responsibility
//! - Model not-yet-validated task input collected by the UI form.
//! - Check drafts against required-field and date-sanity rules.
//! - Produce `ValidatedDraft`, the only input accepted by task creation.
//!
//! # Invariants
//! - Every rule runs; all failing field messages are reported together.
//! - A report is valid iff it carries no field errors.
//! - An absent or unparseable due date is never an error.

use crate::model::category::CategoryRegistry;
use crate::model::task::{parse_due_date, TaskPriority};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const TITLE_REQUIRED: &str = "Title is required";
pub const CATEGORY_REQUIRED: &str = "Please select a category";
pub const DUE_DATE_IN_PAST: &str = "Due date can't be in the past";

/// Raw task input as collected by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    /// Raw date text; `None` and blank both mean "no due date".
    pub due_date: Option<String>,
    pub priority: TaskPriority,
    /// Empty string means "nothing selected".
    pub category_id: String,
}

impl TaskDraft {
    /// Starts a draft with the two required fields; everything else defaults.
    pub fn new(title: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category_id: category_id.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Validates and, when clean, converts into an admissible draft.
    ///
    /// # Errors
    /// - Returns the full report when any rule fails.
    pub fn admit(
        self,
        registry: &CategoryRegistry,
        today: NaiveDate,
    ) -> Result<ValidatedDraft, ValidationReport> {
        let report = validate_draft(&self, registry, today);
        if !report.is_valid() {
            return Err(report);
        }

        let due_date = self.due_date.as_deref().and_then(parse_due_date);
        Ok(ValidatedDraft {
            title: self.title.trim().to_string(),
            description: self.description,
            due_date,
            priority: self.priority,
            category_id: self.category_id.trim().to_string(),
        })
    }
}

/// Draft that passed validation. Only `TaskDraft::admit` builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    title: String,
    description: String,
    due_date: Option<NaiveDate>,
    priority: TaskPriority,
    category_id: String,
}

impl ValidatedDraft {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }
}

/// Form field a validation message is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DraftField {
    Title,
    CategoryId,
    DueDate,
}

impl DraftField {
    /// Form field name used by the UI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::CategoryId => "categoryId",
            Self::DueDate => "dueDate",
        }
    }
}

impl Display for DraftField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level validation outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<DraftField, &'static str>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failing fields mapped to their user-facing message.
    pub fn errors(&self) -> &BTreeMap<DraftField, &'static str> {
        &self.errors
    }

    pub fn message_for(&self, field: DraftField) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    fn reject(&mut self, field: DraftField, message: &'static str) {
        self.errors.insert(field, message);
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("draft is valid");
        }
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Checks one draft against all admission rules.
///
/// Rules:
/// - `title` must be non-empty after trimming.
/// - `category_id` must be non-empty and known to `registry`.
/// - `due_date`, when it parses, must not be before `today`.
pub fn validate_draft(
    draft: &TaskDraft,
    registry: &CategoryRegistry,
    today: NaiveDate,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    if draft.title.trim().is_empty() {
        report.reject(DraftField::Title, TITLE_REQUIRED);
    }

    let category_id = draft.category_id.trim();
    if category_id.is_empty() || !registry.contains(category_id) {
        report.reject(DraftField::CategoryId, CATEGORY_REQUIRED);
    }

    if let Some(due_date) = draft.due_date.as_deref().and_then(parse_due_date) {
        if due_date < today {
            report.reject(DraftField::DueDate, DUE_DATE_IN_PAST);
        }
    }

    report
}
