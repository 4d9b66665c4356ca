//! Cancellable handle for a fetch running on the tokio runtime.

use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::FetchOutcome;

/// A spawned fetch. Dropping the task aborts the fetch, so a task owned by a
/// UI scope ends with that scope.
#[derive(Debug)]
pub struct FetchTask {
    handle: Option<JoinHandle<FetchOutcome>>,
}

impl FetchTask {
    pub(crate) fn new(handle: JoinHandle<FetchOutcome>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Aborts the in-flight fetch. Files already written are left in place.
    pub fn cancel(&self) {
        if let Some(handle) = &self.handle {
            debug!("cancelling fetch task");
            handle.abort();
        }
    }

    /// Returns true once the fetch has completed or been aborted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Waits for the outcome.
    ///
    /// Returns `None` if the fetch was cancelled and
    /// [`FetchOutcome::UnknownFailure`] if it panicked.
    pub async fn wait(mut self) -> Option<FetchOutcome> {
        let handle = self.handle.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(join_error) if join_error.is_cancelled() => None,
            Err(join_error) => {
                error!(error = %join_error, "fetch task panicked");
                Some(FetchOutcome::UnknownFailure)
            }
        }
    }
}

impl Drop for FetchTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
