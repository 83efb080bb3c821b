//! Repository layer between the task store and the use cases.
//!
//! # Responsibility
//! - Adapt storage records to the domain model.
//! - Keep use cases independent of the store's row shape.

pub mod task_repo;
