//! Core of the task list app: storage, use cases and view state.
//! UI layers talk to `TasksViewModel` and nothing below it.

pub mod app;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod viewmodel;

pub use app::TaskApp;
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Task, TaskId};
pub use repo::task_repo::{TaskRepository, TaskStream};
pub use service::task_use_cases::{
    AddTask, AddTaskUseCase, DeleteTask, DeleteTaskUseCase, GetTasks, GetTasksUseCase,
    TaskUseCases, UpdateTask, UpdateTaskUseCase,
};
pub use store::task_store::{
    SqliteTaskStore, StoreError, StoreResult, TaskRecord, TaskRecordStream, TaskStore,
};
pub use viewmodel::scope::{IntentHandle, ViewModelScope};
pub use viewmodel::tasks_view_model::{TasksViewModel, UiStateObserver, DEFAULT_STOP_GRACE};
pub use viewmodel::ui_state::TaskUiState;

/// Minimal health-check API for bridge smoke tests.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
