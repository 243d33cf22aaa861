//! Batch job polling.
//!
//! A [`BatchJob`] drives an accepted asynchronous batch to a terminal state:
//! `Polling → {Completed, Failed, TimedOut}`. Terminal states never transition
//! back. The wait ceiling is measured from submission and is a hard limit —
//! provider hints do not extend it.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::TomTomError;
use crate::types::BatchResponse;

/// Poll location for an accepted asynchronous batch job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub poll_url: String,
}

/// Lifecycle of one batch job. Owned by the poller for the duration of a
/// single request; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Submitted,
    Polling,
    Completed,
    Failed,
    TimedOut,
}

/// Polling cadence and budget.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Hard ceiling on total wait, measured from submission.
    pub max_wait: Duration,
    /// Sleep between polls while the job reports 202.
    pub poll_interval: Duration,
    /// Sleep after a transient read timeout on a single poll attempt.
    pub transient_backoff: Duration,
    /// Per-request timeout on each status poll.
    pub status_timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
            transient_backoff: Duration::from_secs(1),
            status_timeout: Duration::from_secs(10),
        }
    }
}

/// State machine for one submitted batch job.
pub struct BatchJob {
    handle: JobHandle,
    submitted_at: Instant,
    status: JobStatus,
    config: PollConfig,
}

impl BatchJob {
    #[must_use]
    pub fn new(handle: JobHandle, config: PollConfig) -> Self {
        Self {
            handle,
            submitted_at: Instant::now(),
            status: JobStatus::Submitted,
            config,
        }
    }

    /// Terminal (or pre-terminal) status of the job.
    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Drive the job to a terminal state, returning the completed batch body.
    ///
    /// Per iteration: give up once elapsed time exceeds the ceiling; otherwise
    /// poll the job location. 200 completes, 202 sleeps the poll interval and
    /// retries, a request timeout sleeps the shorter backoff and retries
    /// (elapsed time keeps accruing), and any other status fails with the
    /// upstream status and body preserved.
    ///
    /// # Errors
    ///
    /// - [`TomTomError::TimedOut`] once the ceiling is exceeded.
    /// - [`TomTomError::PollFailed`] on a terminal provider error.
    /// - [`TomTomError::Http`] on a non-timeout transport failure.
    /// - [`TomTomError::Deserialize`] if the completed body is not valid JSON.
    pub async fn run(&mut self, client: &reqwest::Client) -> Result<BatchResponse, TomTomError> {
        self.status = JobStatus::Polling;
        loop {
            if self.submitted_at.elapsed() > self.config.max_wait {
                self.status = JobStatus::TimedOut;
                return Err(TomTomError::TimedOut {
                    waited_secs: self.config.max_wait.as_secs(),
                });
            }

            let response = match client
                .get(&self.handle.poll_url)
                .timeout(self.config.status_timeout)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    tracing::warn!(
                        poll_url = %self.handle.poll_url,
                        "timeout while polling batch status; retrying"
                    );
                    tokio::time::sleep(self.config.transient_backoff).await;
                    continue;
                }
                Err(e) => {
                    self.status = JobStatus::Failed;
                    return Err(e.into());
                }
            };

            match response.status().as_u16() {
                200 => {
                    self.status = JobStatus::Completed;
                    let body = response.text().await?;
                    return serde_json::from_str(&body).map_err(|e| TomTomError::Deserialize {
                        context: format!("batch result from {}", self.handle.poll_url),
                        source: e,
                    });
                }
                202 => {
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                status => {
                    self.status = JobStatus::Failed;
                    let detail = response.text().await.unwrap_or_default();
                    return Err(TomTomError::PollFailed { status, detail });
                }
            }
        }
    }
}
