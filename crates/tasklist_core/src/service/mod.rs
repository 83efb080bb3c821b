//! Use-case layer.
//!
//! # Responsibility
//! - Present narrow, substitutable operations over the repository.
//! - Keep the view model decoupled from the repository's concrete shape.

pub mod task_use_cases;
