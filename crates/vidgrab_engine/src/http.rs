use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::media::MediaService;
use crate::{
    ExportHandle, ExportSpec, FailureKind, JobHandle, JobState, MediaMetadata, ServiceError,
};

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl HttpSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct SubmitResponse {
    job_id: JobHandle,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum RemoteStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: RemoteStatus,
    #[serde(default)]
    metadata: Option<MediaMetadata>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
struct ExportBody<'a> {
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    trim_start: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trim_end: Option<&'a str>,
}

#[derive(Deserialize)]
struct ExportResponse {
    export_id: String,
    #[serde(default)]
    download_url: Option<String>,
}

/// [`MediaService`] over a REST backend:
///
/// * `POST {base}/downloads` with `{"url"}` returns `{"job_id"}`
/// * `GET {base}/downloads/{job_id}` returns `{"status", "metadata"?, "error"?}`
/// * `POST {base}/downloads/{job_id}/exports` with `{"format", "trim_start"?, "trim_end"?}`
///   returns `{"export_id", "download_url"?}`
#[derive(Debug, Clone)]
pub struct HttpMediaService {
    settings: HttpSettings,
    client: reqwest::Client,
}

impl HttpMediaService {
    pub fn new(settings: HttpSettings) -> Result<Self, ServiceError> {
        if settings.base_url.cannot_be_a_base() {
            return Err(ServiceError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ServiceError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            };
            return Err(ServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }
        response.json::<T>().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl MediaService for HttpMediaService {
    async fn submit_download(&self, url: &str) -> Result<JobHandle, ServiceError> {
        Url::parse(url).map_err(|err| ServiceError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let response = self
            .client
            .post(self.endpoint(&["downloads"])?)
            .json(&SubmitBody { url })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: SubmitResponse = Self::read_json(response).await?;
        Ok(body.job_id)
    }

    async fn poll(&self, job: &JobHandle) -> Result<JobState, ServiceError> {
        let response = self
            .client
            .get(self.endpoint(&["downloads", job.0.as_str()])?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: StatusResponse = Self::read_json(response).await?;
        match body.status {
            RemoteStatus::Queued | RemoteStatus::Running => Ok(JobState::Pending),
            RemoteStatus::Succeeded => body.metadata.map(JobState::Succeeded).ok_or_else(|| {
                ServiceError::new(FailureKind::Decode, "succeeded job without metadata")
            }),
            RemoteStatus::Failed => Ok(JobState::Failed(ServiceError::new(
                FailureKind::Rejected,
                body.error.unwrap_or_default(),
            ))),
        }
    }

    async fn request_export(
        &self,
        job: &JobHandle,
        spec: &ExportSpec,
    ) -> Result<ExportHandle, ServiceError> {
        let (trim_start, trim_end) = match &spec.trim {
            Some((start, end)) => (Some(start.as_str()), Some(end.as_str())),
            None => (None, None),
        };
        let response = self
            .client
            .post(self.endpoint(&["downloads", job.0.as_str(), "exports"])?)
            .json(&ExportBody {
                format: &spec.format,
                trim_start,
                trim_end,
            })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: ExportResponse = Self::read_json(response).await?;
        Ok(ExportHandle {
            export_id: body.export_id,
            download_url: body.download_url,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ServiceError::new(FailureKind::Decode, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
