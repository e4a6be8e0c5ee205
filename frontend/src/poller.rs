//! Waiting for an analysis task to finish.
//!
//! [`poll_until_terminal`] queries the task status once per interval, one
//! request at a time, and returns as soon as the task completes or fails.
//! [`schedule`] wraps that loop so it can be torn down from outside: the
//! returned [`PollHandle`] aborts the loop when cancelled or dropped, so the
//! owner releases the poller simply by letting go of the handle.

use crate::api::AnalysisApi;
use crate::error::ClientError;
use futures::future::{AbortHandle, Abortable, abortable};
use gloo_timers::future::TimeoutFuture;
use log::{debug, info, warn};
use shared::{AnalysisResult, TaskStatus};
use std::future::Future;

pub trait Sleeper {
    fn sleep(&self, ms: u32) -> impl Future<Output = ()>;
}

/// Sleeps on the browser event loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserSleeper;

impl Sleeper for BrowserSleeper {
    fn sleep(&self, ms: u32) -> impl Future<Output = ()> {
        TimeoutFuture::new(ms)
    }
}

pub async fn poll_until_terminal<A, S>(
    api: &A,
    sleeper: &S,
    task_id: &str,
    interval_ms: u32,
) -> Result<AnalysisResult, ClientError>
where
    A: AnalysisApi,
    S: Sleeper,
{
    let mut attempt: u32 = 0;
    loop {
        sleeper.sleep(interval_ms).await;
        attempt += 1;
        debug!("Polling task {} (attempt {})", task_id, attempt);

        let task = api.check_status(task_id).await?;
        match task.status {
            TaskStatus::Pending => continue,
            TaskStatus::Completed => {
                info!("Task {} completed after {} status checks", task_id, attempt);
                return task.result.ok_or_else(|| {
                    ClientError::TaskFailed("Analysis finished without a result.".into())
                });
            }
            TaskStatus::Failed => {
                let message = task.error.unwrap_or_else(|| "Analysis failed.".into());
                warn!("Task {} failed: {}", task_id, message);
                return Err(ClientError::TaskFailed(message));
            }
        }
    }
}

/// Owns a running poll loop. Cancelling happens exactly once: explicitly via
/// [`PollHandle::cancel`] or implicitly on drop.
#[derive(Debug)]
pub struct PollHandle {
    task_id: String,
    abort: AbortHandle,
}

impl PollHandle {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn cancel(self) {}
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if !self.abort.is_aborted() {
            debug!("Stopping poller for task {}", self.task_id);
            self.abort.abort();
        }
    }
}

/// Makes `work` cancellable through the returned handle. The caller spawns
/// the future; it resolves to `Err(Aborted)` once the handle is released.
pub fn schedule<F: Future>(task_id: String, work: F) -> (PollHandle, Abortable<F>) {
    let (future, abort) = abortable(work);
    (PollHandle { task_id, abort }, future)
}
