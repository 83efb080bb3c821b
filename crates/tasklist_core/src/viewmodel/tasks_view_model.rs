//! Task list view model.
//!
//! # Responsibility
//! - Turn the get-all stream into `TaskUiState` for observers.
//! - Hold dialog visibility and draft text for the create flow.
//! - Launch create/toggle/delete intents through the use cases.
//!
//! # Invariants
//! - UI state starts as `Loading` and never returns to it.
//! - A stream failure ends the running collector; only `retry` or a new
//!   subscription after the grace window produces further `Success` states.
//!   Reattaching inside the grace window keeps the failed subscription.
//! - The collector runs while observers are attached and for a grace
//!   window after the last one detaches.
//! - Dropping the view model cancels every task it launched.

use super::scope::{IntentHandle, ViewModelScope};
use super::ui_state::TaskUiState;
use crate::model::task::{Task, TaskId};
use crate::service::task_use_cases::{GetTasks, TaskUseCases};
use crate::store::task_store::StoreResult;
use futures::StreamExt;
use log::{debug, info, warn};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// How long the list subscription survives without observers.
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_millis(5_000);

/// View-state holder for the task list screen.
pub struct TasksViewModel {
    use_cases: TaskUseCases,
    scope: ViewModelScope,
    ui_state: Arc<UiStateSharing>,
    dialog_visible: watch::Sender<bool>,
    draft_text: watch::Sender<String>,
}

impl TasksViewModel {
    pub fn new(use_cases: TaskUseCases, scope: ViewModelScope) -> Self {
        Self::with_stop_grace(use_cases, scope, DEFAULT_STOP_GRACE)
    }

    /// Creates a view model whose list subscription outlives its last
    /// observer by `stop_grace`.
    pub fn with_stop_grace(
        use_cases: TaskUseCases,
        scope: ViewModelScope,
        stop_grace: Duration,
    ) -> Self {
        let ui_state = Arc::new(UiStateSharing::new(
            Arc::clone(&use_cases.get_tasks),
            scope.clone(),
            stop_grace,
        ));
        let (dialog_visible, _) = watch::channel(false);
        let (draft_text, _) = watch::channel(String::new());

        Self {
            use_cases,
            scope,
            ui_state,
            dialog_visible,
            draft_text,
        }
    }

    /// Attaches an observer of the UI state.
    ///
    /// The first attached observer starts the list subscription.
    pub fn observe_ui_state(&self) -> UiStateObserver {
        UiStateSharing::attach(&self.ui_state)
    }

    /// Current UI state, without subscribing.
    pub fn ui_state(&self) -> TaskUiState {
        self.ui_state.state.borrow().clone()
    }

    /// Restarts a terminated list subscription while observers are attached.
    pub fn retry(&self) {
        self.ui_state.retry();
    }

    pub fn is_dialog_visible(&self) -> bool {
        *self.dialog_visible.borrow()
    }

    pub fn observe_dialog_visible(&self) -> watch::Receiver<bool> {
        self.dialog_visible.subscribe()
    }

    pub fn open_dialog(&self) {
        self.dialog_visible.send_replace(true);
    }

    pub fn close_dialog(&self) {
        self.dialog_visible.send_replace(false);
    }

    pub fn draft_text(&self) -> String {
        self.draft_text.borrow().clone()
    }

    pub fn observe_draft_text(&self) -> watch::Receiver<String> {
        self.draft_text.subscribe()
    }

    pub fn set_draft_text(&self, text: impl Into<String>) {
        self.draft_text.send_replace(text.into());
    }

    /// Closes the dialog, launches an add of the draft text and clears the
    /// draft. The dialog closes before the add completes.
    pub fn create_task(&self) -> IntentHandle<StoreResult<()>> {
        self.close_dialog();
        let task = Task::new(self.draft_text());
        let add_task = Arc::clone(&self.use_cases.add_task);
        let handle = self.launch_mutation("task_create", task.id, async move {
            add_task.add_task(task).await
        });
        self.draft_text.send_replace(String::new());
        handle
    }

    pub fn delete_task(&self, task: &Task) -> IntentHandle<StoreResult<()>> {
        let task = task.clone();
        let delete_task = Arc::clone(&self.use_cases.delete_task);
        self.launch_mutation("task_delete", task.id, async move {
            delete_task.delete_task(task).await
        })
    }

    /// Launches an update with `completed` flipped.
    pub fn toggle_task(&self, task: &Task) -> IntentHandle<StoreResult<()>> {
        let toggled = task.toggled();
        let update_task = Arc::clone(&self.use_cases.update_task);
        self.launch_mutation("task_toggle", toggled.id, async move {
            update_task.update_task(toggled).await
        })
    }

    fn launch_mutation<F>(
        &self,
        event: &'static str,
        task_id: TaskId,
        mutation: F,
    ) -> IntentHandle<StoreResult<()>>
    where
        F: Future<Output = StoreResult<()>> + Send + 'static,
    {
        self.scope.launch(async move {
            let result = mutation.await;
            match &result {
                Ok(()) => debug!("event={event} module=viewmodel status=ok task_id={task_id}"),
                Err(err) => warn!(
                    "event={event} module=viewmodel status=error task_id={task_id} error={err}"
                ),
            }
            result
        })
    }
}

impl Drop for TasksViewModel {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

/// Attached observer of a view model's UI state.
///
/// Dropping the observer detaches it.
pub struct UiStateObserver {
    receiver: watch::Receiver<TaskUiState>,
    sharing: Arc<UiStateSharing>,
}

impl UiStateObserver {
    pub fn current(&self) -> TaskUiState {
        self.receiver.borrow().clone()
    }

    /// Waits for the next state change.
    pub async fn changed(&mut self) -> Option<TaskUiState> {
        self.receiver.changed().await.ok()?;
        let state = self.receiver.borrow_and_update();
        Some((*state).clone())
    }

    /// Waits until the state satisfies `predicate`, checking the current
    /// state first.
    pub async fn wait_for(
        &mut self,
        mut predicate: impl FnMut(&TaskUiState) -> bool,
    ) -> Option<TaskUiState> {
        self.receiver
            .wait_for(|state| predicate(state))
            .await
            .ok()
            .map(|state| (*state).clone())
    }
}

impl Drop for UiStateObserver {
    fn drop(&mut self) {
        self.sharing.detach();
    }
}

struct UiStateSharing {
    state: Arc<watch::Sender<TaskUiState>>,
    get_tasks: Arc<dyn GetTasks>,
    scope: ViewModelScope,
    stop_grace: Duration,
    subscription: Mutex<Subscription>,
}

#[derive(Default)]
struct Subscription {
    observers: usize,
    // Bumped on every attach/detach so a stale stop timer cannot fire.
    epoch: u64,
    collector: Option<IntentHandle<()>>,
    stop_timer: Option<IntentHandle<()>>,
}

impl Subscription {
    fn is_collecting(&self) -> bool {
        self.collector
            .as_ref()
            .is_some_and(|collector| !collector.is_finished())
    }

    fn stop_collector(&mut self) {
        if let Some(collector) = self.collector.take() {
            collector.abort();
            info!("event=ui_state_unsubscribe module=viewmodel status=ok");
        }
    }
}

impl UiStateSharing {
    fn new(get_tasks: Arc<dyn GetTasks>, scope: ViewModelScope, stop_grace: Duration) -> Self {
        let (state, _) = watch::channel(TaskUiState::Loading);
        Self {
            state: Arc::new(state),
            get_tasks,
            scope,
            stop_grace,
            subscription: Mutex::new(Subscription::default()),
        }
    }

    fn attach(this: &Arc<Self>) -> UiStateObserver {
        let receiver = this.state.subscribe();
        {
            let mut subscription = this.lock();
            subscription.observers += 1;
            subscription.epoch = subscription.epoch.wrapping_add(1);
            if let Some(timer) = subscription.stop_timer.take() {
                timer.abort();
            }
            // A finished collector stays in place until the stop timer clears it.
            if subscription.observers == 1 && subscription.collector.is_none() {
                subscription.collector = Some(this.start_collector());
            }
        }

        UiStateObserver {
            receiver,
            sharing: Arc::clone(this),
        }
    }

    fn detach(self: &Arc<Self>) {
        let mut subscription = self.lock();
        subscription.observers = subscription.observers.saturating_sub(1);
        if subscription.observers > 0 {
            return;
        }

        subscription.epoch = subscription.epoch.wrapping_add(1);
        if self.stop_grace.is_zero() {
            subscription.stop_collector();
            return;
        }

        let epoch = subscription.epoch;
        let grace = self.stop_grace;
        let sharing = Arc::clone(self);
        subscription.stop_timer = Some(self.scope.launch(async move {
            tokio::time::sleep(grace).await;
            sharing.stop_if_idle(epoch);
        }));
    }

    fn stop_if_idle(&self, epoch: u64) {
        let mut subscription = self.lock();
        if subscription.observers == 0 && subscription.epoch == epoch {
            subscription.stop_timer = None;
            subscription.stop_collector();
        }
    }

    fn retry(&self) {
        let mut subscription = self.lock();
        if subscription.observers > 0 && !subscription.is_collecting() {
            subscription.collector = Some(self.start_collector());
        }
    }

    fn start_collector(&self) -> IntentHandle<()> {
        let state = Arc::clone(&self.state);
        let get_tasks = Arc::clone(&self.get_tasks);
        info!("event=ui_state_subscribe module=viewmodel status=start");

        self.scope.launch(async move {
            let mut snapshots = get_tasks.get_tasks();
            while let Some(snapshot) = snapshots.next().await {
                match snapshot {
                    Ok(tasks) => {
                        debug!(
                            "event=ui_state_update module=viewmodel status=ok task_count={}",
                            tasks.len()
                        );
                        state.send_replace(TaskUiState::Success(tasks));
                    }
                    Err(err) => {
                        warn!("event=ui_state_update module=viewmodel status=error error={err}");
                        state.send_replace(TaskUiState::Error(Arc::new(err)));
                        return;
                    }
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, Subscription> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
