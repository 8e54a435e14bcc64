//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value slot contract the task store persists through.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Slot keys are non-blank.
//! - A write replaces the whole slot value; there are no partial updates.

pub mod kv_repo;
