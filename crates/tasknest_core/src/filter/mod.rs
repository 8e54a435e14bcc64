//! Filter engine for the visible task list.
//!
//! # Responsibility
//! - Derive UI-visible task subsets from (status, category) criteria.
//! - Keep filtering pure; no storage access happens here.

pub mod task_filter;
