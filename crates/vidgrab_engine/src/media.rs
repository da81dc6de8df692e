use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::{
    ExportHandle, ExportSpec, FailureKind, JobHandle, JobState, MediaMetadata, ServiceError,
};

/// The media-fetch job collaborator.
#[async_trait::async_trait]
pub trait MediaService: Send + Sync {
    /// Start resolving `url`. Returns as soon as the job is accepted.
    async fn submit_download(&self, url: &str) -> Result<JobHandle, ServiceError>;

    async fn poll(&self, job: &JobHandle) -> Result<JobState, ServiceError>;

    async fn request_export(
        &self,
        job: &JobHandle,
        spec: &ExportSpec,
    ) -> Result<ExportHandle, ServiceError>;
}

pub const SIMULATED_DELAY: Duration = Duration::from_millis(1500);

/// Stand-in service that resolves every job after a fixed delay with canned
/// metadata. Useful for demos and tests without a backend.
pub struct SimulatedMediaService {
    delay: Duration,
    metadata: MediaMetadata,
    next_id: AtomicU64,
    jobs: Mutex<HashMap<JobHandle, Instant>>,
}

impl Default for SimulatedMediaService {
    fn default() -> Self {
        Self::new(SIMULATED_DELAY)
    }
}

impl SimulatedMediaService {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            metadata: MediaMetadata {
                title: "Amazing Music Video 4K - Official Video".to_string(),
                author: "Artist Name".to_string(),
                duration_label: "03:45".to_string(),
                thumbnail_url: Some(
                    "https://images.unsplash.com/photo-1511671782779-c97d3d27a1d4?auto=format&fit=crop&w=800&q=80"
                        .to_string(),
                ),
            },
            next_id: AtomicU64::new(1),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_metadata(mut self, metadata: MediaMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    fn started_at(&self, job: &JobHandle) -> Result<Instant, ServiceError> {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(job)
            .copied()
            .ok_or_else(|| ServiceError::new(FailureKind::Rejected, format!("unknown job {job}")))
    }
}

#[async_trait::async_trait]
impl MediaService for SimulatedMediaService {
    async fn submit_download(&self, url: &str) -> Result<JobHandle, ServiceError> {
        url::Url::parse(url)
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let job = JobHandle(format!("sim-{id}"));
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job.clone(), Instant::now());
        Ok(job)
    }

    async fn poll(&self, job: &JobHandle) -> Result<JobState, ServiceError> {
        let started = self.started_at(job)?;
        if started.elapsed() >= self.delay {
            Ok(JobState::Succeeded(self.metadata.clone()))
        } else {
            Ok(JobState::Pending)
        }
    }

    async fn request_export(
        &self,
        job: &JobHandle,
        spec: &ExportSpec,
    ) -> Result<ExportHandle, ServiceError> {
        self.started_at(job)?;
        Ok(ExportHandle {
            export_id: format!("{job}-{}", spec.format),
            download_url: None,
        })
    }
}
