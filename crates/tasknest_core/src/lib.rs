//! Core domain logic for TaskNest.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use filter::task_filter::{
    filter_tasks, CategoryFilter, FilterParseError, StatusFilter, TaskFilter, TaskStats,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryRegistry};
pub use model::draft::{validate_draft, DraftField, TaskDraft, ValidatedDraft, ValidationReport};
pub use model::task::{parse_due_date, Task, TaskId, TaskPriority, TaskStatus};
pub use repo::kv_repo::{
    KeyValueRepository, MemoryKvRepository, RepoError, RepoResult, SqliteKvRepository,
};
pub use service::clock::{Clock, FixedClock, SystemClock};
pub use service::id_gen::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use service::task_store::{CreateOutcome, StoreError, StoreResult, TaskStore, TASKS_SLOT_KEY};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
