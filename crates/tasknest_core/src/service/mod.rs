//! Core use-case services.
//!
//! # Responsibility
//! - Own the session task list and orchestrate validation, mutation and
//!   persistence.
//! - Keep UI/FFI layers decoupled from storage details.
//!
//! # Invariants
//! - Id generation and time are injected, never read from ambient state.

pub mod clock;
pub mod id_gen;
pub mod task_store;
