//! Fixed-interval polling of server-side tasks.

use async_trait::async_trait;
use log::{debug, warn};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{TaskState, TaskStatus};

/// Default ceiling on status queries.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default wait between status queries in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// Anything that can report the current status of a task.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStatusSource: Send + Sync {
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus>;
}

/// Caller-supplied retry ceiling and wait between queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub max_retries: u32,
    pub poll_interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl PollOptions {
    pub fn new(max_retries: u32, poll_interval: Duration) -> Self {
        Self {
            max_retries,
            poll_interval,
        }
    }
}

/// Queries `task_id` until it reaches a terminal state or the retry ceiling.
///
/// Returns the final status only when it is exactly `completed`. A `failed`
/// status ends polling at once with [`Error::TaskFailed`], even on the last
/// permitted attempt. Reaching the ceiling yields
/// [`Error::RetriesExhausted`]; a ceiling of zero makes no query at all.
/// Errors from the source are returned as they are.
#[tracing::instrument(skip(source, options))]
pub async fn poll_until_done<S>(source: &S, task_id: &str, options: PollOptions) -> Result<TaskStatus>
where
    S: TaskStatusSource + ?Sized,
{
    let mut retries: u32 = 0;

    while retries < options.max_retries {
        let status = source.task_status(task_id).await?;
        debug!(
            "Task {} is {} (query {}/{})",
            task_id,
            status.status,
            retries + 1,
            options.max_retries
        );

        match status.status {
            TaskState::Completed => return Ok(status),
            TaskState::Failed => {
                return Err(Error::TaskFailed {
                    task_id: task_id.to_string(),
                    status,
                });
            }
            TaskState::Unknown => {
                warn!("Task {} reported an unrecognised status, still waiting", task_id)
            }
            TaskState::Pending | TaskState::InProgress => {}
        }

        retries += 1;
        // No point sleeping when no query will follow
        if retries < options.max_retries {
            tokio::time::sleep(options.poll_interval).await;
        }
    }

    warn!(
        "Gave up on task {} after {} status queries",
        task_id, options.max_retries
    );
    Err(Error::RetriesExhausted {
        task_id: task_id.to_string(),
        max_retries: options.max_retries,
    })
}
