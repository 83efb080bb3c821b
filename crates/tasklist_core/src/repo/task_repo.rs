//! Task repository over the task store.
//!
//! # Responsibility
//! - Expose the store's live query as domain `Task` lists.
//! - Translate domain tasks into storage records for writes.
//!
//! # Invariants
//! - No business rules live here; store errors are returned unchanged.

use crate::model::task::Task;
use crate::store::task_store::{StoreResult, TaskRecord, TaskStore};
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;

/// Live list of domain tasks.
pub type TaskStream = BoxStream<'static, StoreResult<Vec<Task>>>;

/// Facade over a shared task store.
pub struct TaskRepository<S: TaskStore> {
    store: Arc<S>,
}

impl<S: TaskStore> Clone for TaskRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: TaskStore + 'static> TaskRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Every snapshot of the store, mapped to domain tasks.
    pub fn tasks(&self) -> TaskStream {
        self.store
            .observe_all()
            .map(|snapshot| {
                snapshot.map(|records| records.into_iter().map(Task::from).collect::<Vec<_>>())
            })
            .boxed()
    }

    pub async fn add(&self, task: &Task) -> StoreResult<()> {
        self.store.insert(TaskRecord::from(task)).await
    }

    pub async fn update(&self, task: &Task) -> StoreResult<()> {
        self.store.update(TaskRecord::from(task)).await
    }

    pub async fn delete(&self, task: &Task) -> StoreResult<()> {
        self.store.delete(TaskRecord::from(task)).await
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: record.id,
            text: record.task,
            completed: record.selected,
        }
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            task: task.text.clone(),
            selected: task.completed,
        }
    }
}
