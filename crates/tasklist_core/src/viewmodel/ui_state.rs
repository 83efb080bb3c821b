use crate::model::task::Task;
use crate::store::task_store::StoreError;
use std::sync::Arc;

/// What the task list screen renders.
#[derive(Debug, Clone, Default)]
pub enum TaskUiState {
    /// No snapshot received yet.
    #[default]
    Loading,
    Success(Vec<Task>),
    /// The list stream failed; terminal for the current subscription.
    Error(Arc<StoreError>),
}

impl TaskUiState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Tasks of a `Success` state.
    pub fn tasks(&self) -> Option<&[Task]> {
        match self {
            Self::Success(tasks) => Some(tasks),
            Self::Loading | Self::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&StoreError> {
        match self {
            Self::Error(cause) => Some(cause),
            Self::Loading | Self::Success(_) => None,
        }
    }
}
