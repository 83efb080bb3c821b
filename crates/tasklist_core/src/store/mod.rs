//! Persistence boundary for task rows.
//!
//! # Responsibility
//! - Define the data-access contract the repository depends on.
//! - Keep SQL and connection handling inside this module.

pub mod task_store;
