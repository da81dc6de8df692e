use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generation number chosen by the coordinator for each submission.
pub type Generation = u64;

/// Profile fields of a signed-in user, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub photo_url: Option<String>,
}

/// Opaque id issued by the media service for a download job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(pub String);

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Video details reported by the media service. Every field may be absent;
/// blanks are filled in by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, rename = "duration")]
    pub duration_label: String,
    #[serde(default, rename = "thumbnail")]
    pub thumbnail_url: Option<String>,
}

/// Result of polling a job once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Succeeded(MediaMetadata),
    Failed(ServiceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSpec {
    /// Format id as understood by the service, e.g. `"mp3"`.
    pub format: String,
    pub trim: Option<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportHandle {
    pub export_id: String,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    SessionChanged(Option<Identity>),
    SignInFailed(AuthError),
    SignOutFailed(AuthError),
    JobCompleted {
        generation: Generation,
        result: Result<(JobHandle, MediaMetadata), ServiceError>,
    },
    ExportCompleted {
        generation: Generation,
        result: Result<ExportHandle, ServiceError>,
    },
}

/// Failure of an interactive identity-provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("sign-in dismissed")]
    Dismissed,
    #[error("sign-in denied: {0}")]
    Denied(String),
    #[error("identity provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Errors worth retrying at the service boundary.
    pub fn is_transient(&self) -> bool {
        match self.kind {
            FailureKind::Network | FailureKind::Timeout => true,
            FailureKind::HttpStatus(code) => code == 429 || (500..600).contains(&code),
            _ => false,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ServiceError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    /// The service processed the job and reported failure.
    Rejected,
    /// The job did not finish within the polling budget.
    Expired,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed service response"),
            FailureKind::Rejected => write!(f, "download failed"),
            FailureKind::Expired => write!(f, "download took too long"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
