//! Explicit wiring of store, repository, use cases and view model.
//!
//! # Invariants
//! - One store instance per `TaskApp`, shared by every layer above it.

use crate::config::CoreConfig;
use crate::repo::task_repo::TaskRepository;
use crate::service::task_use_cases::TaskUseCases;
use crate::store::task_store::{SqliteTaskStore, StoreResult};
use crate::viewmodel::scope::ViewModelScope;
use crate::viewmodel::tasks_view_model::TasksViewModel;
use log::info;
use std::sync::Arc;
use tokio::runtime::Handle;

/// A fully wired task list.
pub struct TaskApp {
    repository: TaskRepository<SqliteTaskStore>,
    view_model: TasksViewModel,
}

impl TaskApp {
    /// Opens the configured database and wires every layer on `handle`.
    pub fn open(config: &CoreConfig, handle: Handle) -> StoreResult<Self> {
        let store = SqliteTaskStore::open(&config.db_path)?;
        info!(
            "event=app_open module=app status=ok stop_grace_ms={}",
            config.stop_grace.as_millis()
        );
        Ok(Self::with_store(store, config, handle))
    }

    /// Wires every layer over an existing store.
    pub fn with_store(store: SqliteTaskStore, config: &CoreConfig, handle: Handle) -> Self {
        let repository = TaskRepository::new(Arc::new(store));
        let view_model = TasksViewModel::with_stop_grace(
            TaskUseCases::from_repository(&repository),
            ViewModelScope::new(handle),
            config.stop_grace,
        );
        Self {
            repository,
            view_model,
        }
    }

    pub fn view_model(&self) -> &TasksViewModel {
        &self.view_model
    }

    pub fn repository(&self) -> &TaskRepository<SqliteTaskStore> {
        &self.repository
    }
}
