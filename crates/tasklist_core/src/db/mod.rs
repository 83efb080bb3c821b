//! SQLite bootstrap and schema migrations for the task store.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A connection handed out by this module is fully migrated.
//!
//! Failures surface as `StoreError::Sqlite` or
//! `StoreError::UnsupportedSchemaVersion`.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
