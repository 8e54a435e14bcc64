//! Domain model for tasks, drafts and categories.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own admission rules for user-supplied task input.
//!
//! # Invariants
//! - Tasks enter the store only as `ValidatedDraft` values.
//! - Categories are static configuration, never user data.

pub mod category;
pub mod draft;
pub mod task;
