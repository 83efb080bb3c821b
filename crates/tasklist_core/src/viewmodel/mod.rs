//! View-state layer between the use cases and a UI boundary.
//!
//! # Responsibility
//! - Own observable screen state and the intents that change it.
//! - Scope asynchronous work to the view model's lifetime.

pub mod scope;
pub mod tasks_view_model;
pub mod ui_state;
