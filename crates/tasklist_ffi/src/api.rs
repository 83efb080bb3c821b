//! Flutter-facing task list API.
//!
//! # Responsibility
//! - Expose the task view model to Dart as plain sync calls.
//! - Own the process-wide runtime and wired `TaskApp`.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Intents are fire-and-forget; Dart polls `tasks_state` or re-reads
//!   after its own UI events.

use log::warn;
use once_cell::sync::OnceCell;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tasklist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, Task, TaskApp, TaskUiState, UiStateObserver,
};
use tokio::runtime::Runtime;

static BRIDGE: OnceCell<Bridge> = OnceCell::new();

struct Bridge {
    // Keeps the runtime alive for the view model's scope.
    _runtime: Runtime,
    app: TaskApp,
    observer: Mutex<Option<UiStateObserver>>,
}

impl Bridge {
    fn observer(&self) -> MutexGuard<'_, Option<UiStateObserver>> {
        self.observer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row of the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

/// Snapshot of everything the task screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskScreenState {
    /// `loading`, `success` or `error`.
    pub status: String,
    pub items: Vec<TaskItem>,
    /// Error text when `status == "error"`, empty otherwise.
    pub message: String,
    pub show_dialog: bool,
    pub draft_text: String,
}

/// Result of a bridge call that can fail before reaching the view model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    pub message: String,
}

impl TaskActionResponse {
    fn success() -> Self {
        Self {
            ok: true,
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Starts observing the task list (screen became visible).
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_attach() -> TaskActionResponse {
    with_bridge("tasks_attach", |bridge| {
        let mut observer = bridge.observer();
        if observer.is_none() {
            *observer = Some(bridge.app.view_model().observe_ui_state());
        }
    })
}

/// Stops observing; the subscription lingers for the grace window.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_detach() -> TaskActionResponse {
    with_bridge("tasks_detach", |bridge| {
        bridge.observer().take();
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_state() -> TaskScreenState {
    match bridge() {
        Ok(bridge) => screen_state(bridge),
        Err(message) => TaskScreenState {
            status: "error".to_string(),
            items: Vec::new(),
            message,
            show_dialog: false,
            draft_text: String::new(),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_open_dialog() -> TaskActionResponse {
    with_bridge("tasks_open_dialog", |bridge| bridge.app.view_model().open_dialog())
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_close_dialog() -> TaskActionResponse {
    with_bridge("tasks_close_dialog", |bridge| {
        bridge.app.view_model().close_dialog()
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_set_draft_text(text: String) -> TaskActionResponse {
    with_bridge("tasks_set_draft_text", |bridge| {
        bridge.app.view_model().set_draft_text(text)
    })
}

/// Resubscribes to the task list after a load failure.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_retry() -> TaskActionResponse {
    with_bridge("tasks_retry", |bridge| bridge.app.view_model().retry())
}

/// Creates a task from the current draft text.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_create() -> TaskActionResponse {
    with_bridge("tasks_create", |bridge| {
        bridge.app.view_model().create_task();
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_toggle(item: TaskItem) -> TaskActionResponse {
    with_bridge("tasks_toggle", |bridge| {
        bridge.app.view_model().toggle_task(&to_task(item));
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_delete(item: TaskItem) -> TaskActionResponse {
    with_bridge("tasks_delete", |bridge| {
        bridge.app.view_model().delete_task(&to_task(item));
    })
}

fn with_bridge(call: &str, f: impl FnOnce(&Bridge)) -> TaskActionResponse {
    match bridge() {
        Ok(bridge) => {
            f(bridge);
            TaskActionResponse::success()
        }
        Err(message) => {
            warn!("event=ffi_call module=ffi status=error call={call} error_code=bridge_unavailable");
            TaskActionResponse::failure(format!("{call} failed: {message}"))
        }
    }
}

fn bridge() -> Result<&'static Bridge, String> {
    BRIDGE.get_or_try_init(|| {
        let config =
            CoreConfig::from_env().map_err(|err| format!("invalid configuration: {err}"))?;
        if let Err(err) = start_configured_logging(&config) {
            warn!("event=ffi_logging_init module=ffi status=error error={err}");
        }
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("tasklist-core")
            .enable_all()
            .build()
            .map_err(|err| format!("runtime start failed: {err}"))?;
        let app = TaskApp::open(&config, runtime.handle().clone())
            .map_err(|err| format!("task database open failed: {err}"))?;

        Ok(Bridge {
            _runtime: runtime,
            app,
            observer: Mutex::new(None),
        })
    })
}

/// Starts file logging when the environment names a log directory.
fn start_configured_logging(config: &CoreConfig) -> Result<(), String> {
    match &config.log_dir {
        Some(dir) => init_logging_inner(&config.log_level, &dir.to_string_lossy()),
        None => Ok(()),
    }
}

fn screen_state(bridge: &Bridge) -> TaskScreenState {
    let view_model = bridge.app.view_model();
    let (status, items, message) = match view_model.ui_state() {
        TaskUiState::Loading => ("loading", Vec::new(), String::new()),
        TaskUiState::Success(tasks) => (
            "success",
            tasks.into_iter().map(to_item).collect(),
            String::new(),
        ),
        TaskUiState::Error(cause) => ("error", Vec::new(), cause.to_string()),
    };

    TaskScreenState {
        status: status.to_string(),
        items,
        message,
        show_dialog: view_model.is_dialog_visible(),
        draft_text: view_model.draft_text(),
    }
}

fn to_item(task: Task) -> TaskItem {
    TaskItem {
        id: task.id,
        text: task.text,
        completed: task.completed,
    }
}

fn to_task(item: TaskItem) -> Task {
    Task {
        id: item.id,
        text: item.text,
        completed: item.completed,
    }
}
