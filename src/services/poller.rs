//! Bounded wait for a fitting job to reach a terminal status.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::models::job::TryOnJob;
use crate::services::fitting::{FittingApiError, RemoteJobClient};

/// Wait budget for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    max_wait: Duration,
    poll_interval: Duration,
}

impl PollPolicy {
    /// Both durations must be non-zero.
    pub fn new(max_wait: Duration, poll_interval: Duration) -> Result<Self, PollError> {
        if poll_interval.is_zero() {
            return Err(PollError::InvalidPolicy(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if max_wait.is_zero() {
            return Err(PollError::InvalidPolicy(
                "max wait must be greater than zero".to_string(),
            ));
        }
        if poll_interval.saturating_mul(10) > max_wait {
            tracing::warn!(
                max_wait_ms = max_wait.as_millis() as u64,
                poll_interval_ms = poll_interval.as_millis() as u64,
                "Poll interval is not an order of magnitude below the max wait"
            );
        }

        Ok(Self {
            max_wait,
            poll_interval,
        })
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Drives `fetch_status` until the job is completed or failed.
pub struct CompletionPoller {
    client: Arc<dyn RemoteJobClient>,
}

impl CompletionPoller {
    pub fn new(client: Arc<dyn RemoteJobClient>) -> Self {
        Self { client }
    }

    /// Poll `job_id` until it is terminal, the budget runs out, or `cancel` fires.
    ///
    /// Returns as soon as a terminal status is seen, without sleeping after
    /// it. Fetch failures are returned immediately and never retried. An
    /// in-flight fetch is abandoned when `cancel` fires.
    pub async fn wait_for_terminal(
        &self,
        job_id: &str,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<TryOnJob, PollError> {
        let start = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(PollError::Cancelled);
            }

            attempts += 1;
            metrics::counter!("fitting_status_polls_total").increment(1);
            let job = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(job_id = %job_id, attempts, "Polling cancelled during status fetch");
                    return Err(PollError::Cancelled);
                }
                fetched = self.client.fetch_status(job_id) => fetched?,
            };

            if job.is_terminal() {
                tracing::debug!(
                    job_id = %job_id,
                    attempts,
                    status = ?job.status,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Fitting job reached terminal status"
                );
                return Ok(job);
            }

            let elapsed = start.elapsed();
            if elapsed >= policy.max_wait {
                tracing::warn!(
                    job_id = %job_id,
                    attempts,
                    last_status = ?job.status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Gave up waiting for fitting job"
                );
                return Err(PollError::Timeout {
                    job_id: job_id.to_string(),
                    waited: elapsed,
                });
            }

            tracing::trace!(job_id = %job_id, attempts, status = ?job.status, "Fitting job still running");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(job_id = %job_id, attempts, "Polling cancelled");
                    return Err(PollError::Cancelled);
                }
                _ = tokio::time::sleep(policy.poll_interval) => {}
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Invalid poll policy: {0}")]
    InvalidPolicy(String),

    #[error("Fitting job {job_id} did not finish within {waited:?}")]
    Timeout { job_id: String, waited: Duration },

    #[error("Polling was cancelled")]
    Cancelled,

    #[error(transparent)]
    Api(#[from] FittingApiError),
}
