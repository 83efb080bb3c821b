//! Domain model for the task list.
//!
//! # Responsibility
//! - Define the canonical `Task` shape used above the storage layer.
//! - Own task identity generation.

pub mod task;
