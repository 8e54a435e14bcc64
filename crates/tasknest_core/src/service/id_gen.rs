//! Task id generation.
//!
//! # Invariants
//! - A generator never returns the same id twice within its lifetime.
//! - The store additionally skips ids that already exist in loaded data.

use crate::model::task::TaskId;
use uuid::Uuid;

/// Source of fresh task ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> TaskId;
}

/// Random UUID v4 ids in hyphenated lowercase form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> TaskId {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix><n>` ids, starting at 1.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("task-")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> TaskId {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
