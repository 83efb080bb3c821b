//! Task domain model.
//!
//! # Responsibility
//! - Define the single entity persisted by the task list.
//! - Issue unique, insertion-ordered task identifiers.
//!
//! # Invariants
//! - `id` is never changed after creation and never reused in-process.
//! - `completed` changes only through a modified copy (`Task::toggled`).
//! - Issued ids are strictly increasing for the process lifetime.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Stable integer identifier of a task row.
pub type TaskId = i64;

static LAST_TASK_ID: AtomicI64 = AtomicI64::new(0);

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Free text; empty text is allowed.
    pub text: String,
    pub completed: bool,
}

impl Task {
    /// Creates an unchecked task with a freshly issued id.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(next_task_id(), text)
    }

    /// Creates an unchecked task with a caller-provided id.
    ///
    /// Used by boundary layers that rebuild a task from an id they received
    /// earlier. No uniqueness check happens here; the store rejects
    /// collisions on insert.
    pub fn with_id(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }

    /// Returns a copy with `completed` flipped.
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Issues the next task id.
///
/// The id is the current epoch millisecond, bumped past the last issued id
/// whenever the clock has not moved forward far enough.
pub fn next_task_id() -> TaskId {
    let now = epoch_millis();
    let previous = LAST_TASK_ID
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or_else(|last| last);
    now.max(previous.saturating_add(1))
}

/// Guarantees that ids issued from now on are greater than `id`.
///
/// Stores call this with their largest persisted id when opened.
pub fn reserve_task_ids_through(id: TaskId) {
    LAST_TASK_ID.fetch_max(id, Ordering::AcqRel);
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{next_task_id, reserve_task_ids_through, Task};

    #[test]
    fn new_task_starts_unchecked() {
        let task = Task::new("water plants");
        assert_eq!(task.text, "water plants");
        assert!(!task.completed);
    }

    #[test]
    fn toggled_keeps_identity_and_text() {
        let task = Task::with_id(7, "call bank");
        let toggled = task.toggled();
        assert_eq!(toggled.id, 7);
        assert_eq!(toggled.text, "call bank");
        assert!(toggled.completed);
        assert!(!task.completed);
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let mut previous = next_task_id();
        for _ in 0..1_000 {
            let id = next_task_id();
            assert!(id > previous, "{id} should be greater than {previous}");
            previous = id;
        }
    }

    #[test]
    fn reserved_ids_are_skipped() {
        let ceiling = next_task_id() + 1_000_000;
        reserve_task_ids_through(ceiling);
        assert!(next_task_id() > ceiling);
    }
}
