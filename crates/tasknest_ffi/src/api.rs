//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own one task session per UI instance and translate core results into
//!   plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Validation failures come back as field errors, never as thrown errors.
//! - Unknown task ids are reported as `changed=false`, not as failures.

use log::warn;
use std::sync::{Mutex, MutexGuard};
use tasknest_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CategoryRegistry, CoreConfig, CreateOutcome, SqliteKvRepository, Task, TaskDraft,
    TaskFilter, TaskPriority, TaskStatus, TaskStore,
};

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Category row for pickers and sidebar filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryItem {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Returns the fixed category list in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn list_categories() -> Vec<CategoryItem> {
    CategoryRegistry::builtin()
        .all()
        .iter()
        .map(|category| CategoryItem {
            id: category.id.to_string(),
            name: category.name.to_string(),
            color: category.color.to_string(),
        })
        .collect()
}

/// Task row joined with its category for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD` when set.
    pub due_date: Option<String>,
    /// `low|medium|high`.
    pub priority: String,
    pub category_id: String,
    /// `None` when the task points at a category that no longer exists.
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    /// `pending|completed`.
    pub status: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// One failing form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// `title|categoryId|dueDate`.
    pub field: String,
    pub message: String,
}

/// Response envelope for task creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskResponse {
    pub ok: bool,
    /// Created task on success.
    pub task: Option<TaskItem>,
    /// Non-empty only when the draft failed validation.
    pub field_errors: Vec<FieldError>,
    pub message: String,
}

/// Response envelope for status changes and deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    /// Whether any task was modified.
    pub changed: bool,
    /// Status after the call, when the task exists.
    pub status: Option<String>,
    pub message: String,
}

/// Response envelope for the visible list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<TaskItem>,
    /// True when a status or category filter narrows the list.
    pub filters_active: bool,
    pub message: String,
}

/// Sidebar counters over the unfiltered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStatsItem {
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
}

/// Task session owned by the UI for its whole lifetime.
///
/// Opening loads the persisted list once; every mutation writes it back.
#[flutter_rust_bridge::frb(opaque)]
pub struct TaskSession {
    store: Mutex<TaskStore<SqliteKvRepository>>,
}

impl TaskSession {
    /// Opens a session over a SQLite file.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open(db_path: String) -> Result<TaskSession, String> {
        let trimmed = db_path.trim();
        if trimmed.is_empty() {
            return Err("db_path cannot be empty".to_string());
        }
        let repo = SqliteKvRepository::open(trimmed)
            .map_err(|err| format!("task session open failed: {err}"))?;
        Self::with_repo(repo)
    }

    /// Opens a session at the path resolved from `TASKNEST_DB_PATH`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open_default() -> Result<TaskSession, String> {
        let config = CoreConfig::from_env();
        let repo = SqliteKvRepository::open(&config.db_path)
            .map_err(|err| format!("task session open failed: {err}"))?;
        Self::with_repo(repo)
    }

    /// Opens a throwaway session whose data vanishes with it.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open_in_memory() -> Result<TaskSession, String> {
        let repo = SqliteKvRepository::open_in_memory()
            .map_err(|err| format!("task session open failed: {err}"))?;
        Self::with_repo(repo)
    }

    fn with_repo(repo: SqliteKvRepository) -> Result<Self, String> {
        let store =
            TaskStore::load(repo).map_err(|err| format!("task session open failed: {err}"))?;
        Ok(Self {
            store: Mutex::new(store),
        })
    }

    /// Validates form input and creates a task when it is clean.
    ///
    /// `priority` accepts `low|medium|high`; blank means `medium`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn create_task(
        &self,
        title: String,
        description: String,
        due_date: Option<String>,
        priority: String,
        category_id: String,
    ) -> CreateTaskResponse {
        let priority = match parse_priority(priority.as_str()) {
            Ok(priority) => priority,
            Err(message) => return CreateTaskResponse::failure(message),
        };
        let mut draft = TaskDraft::new(title, category_id)
            .with_description(description)
            .with_priority(priority);
        draft.due_date = due_date;

        let mut store = match self.lock() {
            Ok(store) => store,
            Err(message) => return CreateTaskResponse::failure(message),
        };
        match store.submit(draft) {
            Ok(CreateOutcome::Created(task)) => CreateTaskResponse {
                ok: true,
                task: Some(to_task_item(store.registry(), &task)),
                field_errors: Vec::new(),
                message: "Task created successfully!".to_string(),
            },
            Ok(CreateOutcome::Rejected(report)) => CreateTaskResponse {
                ok: false,
                task: None,
                field_errors: report
                    .errors()
                    .iter()
                    .map(|(field, message)| FieldError {
                        field: field.as_str().to_string(),
                        message: (*message).to_string(),
                    })
                    .collect(),
                message: "Please fix the errors in the form".to_string(),
            },
            Err(err) => CreateTaskResponse::failure(format!("create_task failed: {err}")),
        }
    }

    /// Flips pending/completed for one task.
    #[flutter_rust_bridge::frb(sync)]
    pub fn toggle_status(&self, task_id: String) -> TaskActionResponse {
        let mut store = match self.lock() {
            Ok(store) => store,
            Err(message) => return TaskActionResponse::failure(message),
        };
        match store.toggle_status(task_id.as_str()) {
            Ok(Some(TaskStatus::Completed)) => {
                TaskActionResponse::changed(TaskStatus::Completed, "Task completed!")
            }
            Ok(Some(TaskStatus::Pending)) => {
                TaskActionResponse::changed(TaskStatus::Pending, "Task marked as pending")
            }
            Ok(None) => TaskActionResponse::unchanged(None),
            Err(err) => TaskActionResponse::failure(format!("toggle_status failed: {err}")),
        }
    }

    /// Sets one task to `pending|completed`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn set_status(&self, task_id: String, status: String) -> TaskActionResponse {
        let Some(target) = TaskStatus::parse(status.trim()) else {
            return TaskActionResponse::failure(format!(
                "unsupported status `{status}`; expected pending|completed"
            ));
        };
        let mut store = match self.lock() {
            Ok(store) => store,
            Err(message) => return TaskActionResponse::failure(message),
        };
        match store.set_status(task_id.as_str(), target) {
            Ok(true) => TaskActionResponse::changed(target, "Task status updated"),
            Ok(false) => {
                let current = store.get(task_id.as_str()).map(|task| task.status);
                TaskActionResponse::unchanged(current)
            }
            Err(err) => TaskActionResponse::failure(format!("set_status failed: {err}")),
        }
    }

    /// Deletes one task.
    #[flutter_rust_bridge::frb(sync)]
    pub fn delete_task(&self, task_id: String) -> TaskActionResponse {
        let mut store = match self.lock() {
            Ok(store) => store,
            Err(message) => return TaskActionResponse::failure(message),
        };
        match store.remove(task_id.as_str()) {
            Ok(true) => TaskActionResponse {
                ok: true,
                changed: true,
                status: None,
                message: "Task deleted".to_string(),
            },
            Ok(false) => TaskActionResponse::unchanged(None),
            Err(err) => TaskActionResponse::failure(format!("delete_task failed: {err}")),
        }
    }

    /// Lists visible tasks for `all|pending|completed` and `all|<category id>`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn list_tasks(&self, status_filter: String, category_filter: String) -> TaskListResponse {
        let filter = match TaskFilter::parse(status_filter.as_str(), category_filter.as_str()) {
            Ok(filter) => filter,
            Err(err) => return TaskListResponse::failure(format!("list_tasks failed: {err}")),
        };
        let store = match self.lock() {
            Ok(store) => store,
            Err(message) => return TaskListResponse::failure(message),
        };

        let items = store
            .visible(&filter)
            .into_iter()
            .map(|task| to_task_item(store.registry(), task))
            .collect::<Vec<_>>();
        let message = if !items.is_empty() {
            format!("Showing {} task(s).", items.len())
        } else if filter.is_active() {
            "Try changing your filters to see more tasks".to_string()
        } else {
            "Create your first task using the form above".to_string()
        };
        TaskListResponse {
            ok: true,
            items,
            filters_active: filter.is_active(),
            message,
        }
    }

    /// Counts over all tasks, ignoring filters. Zeros if the session is poisoned.
    #[flutter_rust_bridge::frb(sync)]
    pub fn stats(&self) -> TaskStatsItem {
        let Ok(store) = self.lock() else {
            return TaskStatsItem {
                total: 0,
                completed: 0,
                pending: 0,
            };
        };
        let stats = store.stats();
        TaskStatsItem {
            total: saturating_u32(stats.total),
            completed: saturating_u32(stats.completed),
            pending: saturating_u32(stats.pending),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, TaskStore<SqliteKvRepository>>, String> {
        self.store.lock().map_err(|_| {
            warn!("event=session_lock module=ffi status=error error_code=poisoned");
            "task session is unavailable after an earlier failure".to_string()
        })
    }
}

impl CreateTaskResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            field_errors: Vec::new(),
            message: message.into(),
        }
    }
}

impl TaskActionResponse {
    fn changed(status: TaskStatus, message: &str) -> Self {
        Self {
            ok: true,
            changed: true,
            status: Some(status.as_str().to_string()),
            message: message.to_string(),
        }
    }

    fn unchanged(status: Option<TaskStatus>) -> Self {
        Self {
            ok: true,
            changed: false,
            status: status.map(|value| value.as_str().to_string()),
            message: "No change.".to_string(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            changed: false,
            status: None,
            message: message.into(),
        }
    }
}

impl TaskListResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            filters_active: false,
            message: message.into(),
        }
    }
}

fn parse_priority(raw: &str) -> Result<TaskPriority, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Ok(TaskPriority::default());
    }
    TaskPriority::parse(normalized.as_str())
        .ok_or_else(|| format!("unsupported priority `{normalized}`; expected low|medium|high"))
}

fn to_task_item(registry: &CategoryRegistry, task: &Task) -> TaskItem {
    let category = registry.category_for(task);
    TaskItem {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        due_date: task.due_date.map(|date| date.to_string()),
        priority: task.priority.as_str().to_string(),
        category_id: task.category_id.clone(),
        category_name: category.map(|c| c.name.to_string()),
        category_color: category.map(|c| c.color.to_string()),
        status: task.status.as_str().to_string(),
        created_at_ms: task.created_at.timestamp_millis(),
        updated_at_ms: task.updated_at.timestamp_millis(),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
