//! Cancellable task scope owned by a view model.
//!
//! # Invariants
//! - Work launched through a scope stops at its next await point once the
//!   scope is cancelled.
//! - Cancellation is shared by every clone of a scope.

use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawns fire-and-forget work tied to an owner's lifetime.
#[derive(Debug, Clone)]
pub struct ViewModelScope {
    handle: Handle,
    token: CancellationToken,
}

impl ViewModelScope {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            token: CancellationToken::new(),
        }
    }

    /// Scope on the runtime of the calling task.
    ///
    /// # Panics
    /// - Panics when called outside a Tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Spawns `future` on the scope's runtime.
    pub fn launch<F>(&self, future: F) -> IntentHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let token = self.token.clone();
        let join = self.handle.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                output = future => Some(output),
            }
        });
        IntentHandle { join }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Handle to work launched through a [`ViewModelScope`].
///
/// Dropping it detaches the work; it keeps running until done or cancelled.
#[derive(Debug)]
pub struct IntentHandle<T> {
    join: JoinHandle<Option<T>>,
}

impl<T> IntentHandle<T> {
    /// Waits for the work to finish.
    ///
    /// Returns `None` when the scope was cancelled or the work aborted.
    pub async fn wait(self) -> Option<T> {
        self.join.await.ok().flatten()
    }

    pub fn abort(&self) {
        self.join.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::ViewModelScope;
    use std::time::Duration;

    #[tokio::test]
    async fn launch_returns_output() {
        let scope = ViewModelScope::current();
        let handle = scope.launch(async { 40 + 2 });
        assert_eq!(handle.wait().await, Some(42));
    }

    #[tokio::test]
    async fn cancel_stops_pending_work() {
        let scope = ViewModelScope::current();
        let handle = scope.launch(async {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
            "finished"
        });

        scope.cancel();
        assert!(scope.is_cancelled());
        assert_eq!(handle.wait().await, None);
    }

    #[tokio::test]
    async fn launch_after_cancel_does_not_run() {
        let scope = ViewModelScope::current();
        scope.clone().cancel();
        let handle = scope.launch(async { "ran" });
        assert_eq!(handle.wait().await, None);
    }
}
