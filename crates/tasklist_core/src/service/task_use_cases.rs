//! Single-operation task use cases.
//!
//! # Responsibility
//! - Give the view model one narrow capability per operation.
//! - Forward each call to the repository without added logic.
//!
//! # Invariants
//! - Each capability is object safe, so callers can hold `Arc<dyn …>` and
//!   tests can substitute doubles without touching storage.

use crate::model::task::Task;
use crate::repo::task_repo::{TaskRepository, TaskStream};
use crate::store::task_store::{StoreResult, TaskStore};
use async_trait::async_trait;
use std::sync::Arc;

/// Streams the full task list.
pub trait GetTasks: Send + Sync {
    fn get_tasks(&self) -> TaskStream;
}

#[async_trait]
pub trait AddTask: Send + Sync {
    async fn add_task(&self, task: Task) -> StoreResult<()>;
}

#[async_trait]
pub trait UpdateTask: Send + Sync {
    async fn update_task(&self, task: Task) -> StoreResult<()>;
}

#[async_trait]
pub trait DeleteTask: Send + Sync {
    async fn delete_task(&self, task: Task) -> StoreResult<()>;
}

pub struct GetTasksUseCase<S: TaskStore> {
    repo: TaskRepository<S>,
}

pub struct AddTaskUseCase<S: TaskStore> {
    repo: TaskRepository<S>,
}

pub struct UpdateTaskUseCase<S: TaskStore> {
    repo: TaskRepository<S>,
}

pub struct DeleteTaskUseCase<S: TaskStore> {
    repo: TaskRepository<S>,
}

impl<S: TaskStore + 'static> GetTasksUseCase<S> {
    pub fn new(repo: TaskRepository<S>) -> Self {
        Self { repo }
    }
}

impl<S: TaskStore + 'static> AddTaskUseCase<S> {
    pub fn new(repo: TaskRepository<S>) -> Self {
        Self { repo }
    }
}

impl<S: TaskStore + 'static> UpdateTaskUseCase<S> {
    pub fn new(repo: TaskRepository<S>) -> Self {
        Self { repo }
    }
}

impl<S: TaskStore + 'static> DeleteTaskUseCase<S> {
    pub fn new(repo: TaskRepository<S>) -> Self {
        Self { repo }
    }
}

impl<S: TaskStore + 'static> GetTasks for GetTasksUseCase<S> {
    fn get_tasks(&self) -> TaskStream {
        self.repo.tasks()
    }
}

#[async_trait]
impl<S: TaskStore + 'static> AddTask for AddTaskUseCase<S> {
    async fn add_task(&self, task: Task) -> StoreResult<()> {
        self.repo.add(&task).await
    }
}

#[async_trait]
impl<S: TaskStore + 'static> UpdateTask for UpdateTaskUseCase<S> {
    async fn update_task(&self, task: Task) -> StoreResult<()> {
        self.repo.update(&task).await
    }
}

#[async_trait]
impl<S: TaskStore + 'static> DeleteTask for DeleteTaskUseCase<S> {
    async fn delete_task(&self, task: Task) -> StoreResult<()> {
        self.repo.delete(&task).await
    }
}

/// The four capabilities the view model depends on.
#[derive(Clone)]
pub struct TaskUseCases {
    pub get_tasks: Arc<dyn GetTasks>,
    pub add_task: Arc<dyn AddTask>,
    pub update_task: Arc<dyn UpdateTask>,
    pub delete_task: Arc<dyn DeleteTask>,
}

impl TaskUseCases {
    /// Builds all four use cases over one repository.
    pub fn from_repository<S: TaskStore + 'static>(repo: &TaskRepository<S>) -> Self {
        Self {
            get_tasks: Arc::new(GetTasksUseCase::new(repo.clone())),
            add_task: Arc::new(AddTaskUseCase::new(repo.clone())),
            update_task: Arc::new(UpdateTaskUseCase::new(repo.clone())),
            delete_task: Arc::new(DeleteTaskUseCase::new(repo.clone())),
        }
    }
}
