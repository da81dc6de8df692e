use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use vidgrab_logging::{vg_debug, vg_warn, TARGET_ENGINE};

use crate::media::MediaService;
use crate::{FailureKind, JobHandle, JobState, MediaMetadata, ServiceError};

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// Give up on a job that is still pending after this long.
    pub max_wait: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(250),
            max_wait: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total tries per call, including the first.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): doubles each time, capped.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Run `op`, retrying transient failures with exponential backoff.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.backoff(attempt);
                vg_warn!(
                    target: TARGET_ENGINE,
                    "Transient service error (attempt {attempt}/{}): {err}; retrying in {delay:?}",
                    policy.max_attempts
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Submit `url` and poll until the job settles.
///
/// Submission is not retried since the service may already have accepted
/// the job; polls are.
pub async fn run_download(
    service: &dyn MediaService,
    url: &str,
    poll: &PollSettings,
    retry: &RetryPolicy,
) -> Result<(JobHandle, MediaMetadata), ServiceError> {
    let job = service.submit_download(url).await?;
    vg_debug!(target: TARGET_ENGINE, "Job {job} accepted for {url}");

    let deadline = Instant::now() + poll.max_wait;
    let handle = &job;
    loop {
        match with_retry(retry, move || service.poll(handle)).await? {
            JobState::Succeeded(metadata) => return Ok((job, metadata)),
            JobState::Failed(err) => return Err(err),
            JobState::Pending => {
                if Instant::now() >= deadline {
                    return Err(ServiceError::new(
                        FailureKind::Expired,
                        format!("job {job} still pending after {:?}", poll.max_wait),
                    ));
                }
                tokio::time::sleep(poll.interval).await;
            }
        }
    }
}
