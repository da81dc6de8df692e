use thiserror::Error;

use crate::platform::{validate_url, SubmissionError};

/// Monotonic id bound to each accepted submission.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Submitted,
    Succeeded,
    Failed,
}

/// Opaque handle issued by the media service for an accepted job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(pub String);

impl JobHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub const FALLBACK_TITLE: &str = "Amazing Music Video 4K - Official Video";
pub const FALLBACK_AUTHOR: &str = "Artist Name";
pub const FALLBACK_DURATION: &str = "03:45";
pub const FALLBACK_THUMBNAIL: &str =
    "https://images.unsplash.com/photo-1511671782779-c97d3d27a1d4?auto=format&fit=crop&w=800&q=80";

/// Metadata of a successfully resolved video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub job: JobHandle,
    pub title: String,
    pub author: String,
    pub duration_label: String,
    pub thumbnail_url: Option<String>,
}

impl DownloadResult {
    /// Fill blank fields with the placeholder card values.
    pub fn with_fallbacks(mut self) -> Self {
        fill_blank(&mut self.title, FALLBACK_TITLE);
        fill_blank(&mut self.author, FALLBACK_AUTHOR);
        fill_blank(&mut self.duration_label, FALLBACK_DURATION);
        if self
            .thumbnail_url
            .as_deref()
            .map_or(true, |url| url.trim().is_empty())
        {
            self.thumbnail_url = Some(FALLBACK_THUMBNAIL.to_string());
        }
        self
    }
}

fn fill_blank(field: &mut String, fallback: &str) {
    if field.trim().is_empty() {
        *field = fallback.to_string();
    }
}

/// A job that reached the `failed` state. `message` is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct JobError {
    pub message: String,
}

impl JobError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Why `submit` did not start a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejection {
    /// A job is already running, or a finished one has not been reset.
    NotIdle(JobStatus),
    Invalid(SubmissionError),
}

/// What happened to a completion delivered to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Succeeded,
    Failed,
    Stale,
}

/// The single-request download job: `idle -> submitted -> (succeeded | failed)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobMachine {
    url: String,
    status: JobStatus,
    generation: Generation,
    result: Option<DownloadResult>,
    error: Option<JobError>,
}

impl JobMachine {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn result(&self) -> Option<&DownloadResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&JobError> {
        self.error.as_ref()
    }

    /// Replace the pending URL. Ignored while a job is in flight.
    pub fn set_url(&mut self, url: String) -> bool {
        if self.status == JobStatus::Submitted || self.url == url {
            return false;
        }
        self.url = url;
        true
    }

    pub fn can_submit(&self) -> bool {
        self.status == JobStatus::Idle && !self.url.trim().is_empty()
    }

    /// Accept the pending URL and enter `submitted` under a fresh generation.
    pub fn submit(&mut self) -> Result<(Generation, String), SubmitRejection> {
        if self.status != JobStatus::Idle {
            return Err(SubmitRejection::NotIdle(self.status));
        }
        let url = validate_url(&self.url).map_err(SubmitRejection::Invalid)?;
        self.generation += 1;
        self.status = JobStatus::Submitted;
        self.result = None;
        self.error = None;
        Ok((self.generation, url.into()))
    }

    /// Apply a completion. Anything not addressed to the current in-flight
    /// generation is dropped.
    pub fn complete(
        &mut self,
        generation: Generation,
        outcome: Result<DownloadResult, JobError>,
    ) -> Completion {
        if self.status != JobStatus::Submitted || generation != self.generation {
            return Completion::Stale;
        }
        match outcome {
            Ok(result) => {
                self.status = JobStatus::Succeeded;
                self.result = Some(result);
                self.error = None;
                Completion::Succeeded
            }
            Err(error) => {
                self.status = JobStatus::Failed;
                self.result = None;
                self.error = Some(error);
                Completion::Failed
            }
        }
    }

    /// Return to `idle`, clearing everything. Yields the generation that was
    /// in flight, if any, so the caller can cancel it.
    pub fn reset(&mut self) -> Option<Generation> {
        let in_flight = (self.status == JobStatus::Submitted).then_some(self.generation);
        self.url.clear();
        self.status = JobStatus::Idle;
        self.result = None;
        self.error = None;
        in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str) -> DownloadResult {
        DownloadResult {
            job: JobHandle("job-1".into()),
            title: title.into(),
            author: "Artist Name".into(),
            duration_label: "03:45".into(),
            thumbnail_url: None,
        }
    }

    fn submitted(url: &str) -> (JobMachine, Generation) {
        let mut job = JobMachine::default();
        job.set_url(url.into());
        let (generation, _) = job.submit().unwrap();
        (job, generation)
    }

    #[test]
    fn whitespace_url_is_rejected_without_leaving_idle() {
        let mut job = JobMachine::default();
        job.set_url("   ".into());
        assert_eq!(
            job.submit(),
            Err(SubmitRejection::Invalid(SubmissionError::Empty))
        );
        assert_eq!(job.status(), JobStatus::Idle);
        assert_eq!(job.generation(), 0);
    }

    #[test]
    fn second_submit_while_submitted_is_rejected() {
        let (mut job, generation) = submitted("https://example.com/video");
        assert_eq!(
            job.submit(),
            Err(SubmitRejection::NotIdle(JobStatus::Submitted))
        );
        assert_eq!(job.generation(), generation);
    }

    #[test]
    fn url_edits_are_ignored_while_submitted() {
        let (mut job, _) = submitted("https://example.com/video");
        assert!(!job.set_url("https://other.example.com".into()));
        assert_eq!(job.url(), "https://example.com/video");
    }

    #[test]
    fn failure_clears_result_and_keeps_error() {
        let (mut job, generation) = submitted("https://example.com/video");
        let outcome = job.complete(generation, Err(JobError::new("unsupported platform")));
        assert_eq!(outcome, Completion::Failed);
        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.result().is_none());
        assert_eq!(job.error().unwrap().message, "unsupported platform");
    }

    #[test]
    fn completion_for_old_generation_is_stale() {
        let (mut job, first) = submitted("https://example.com/a");
        assert_eq!(job.reset(), Some(first));
        job.set_url("https://example.com/b".into());
        let (second, _) = job.submit().unwrap();
        assert_ne!(first, second);

        assert_eq!(job.complete(first, Ok(result("old"))), Completion::Stale);
        assert_eq!(job.status(), JobStatus::Submitted);
        assert_eq!(job.complete(second, Ok(result("new"))), Completion::Succeeded);
        assert_eq!(job.result().unwrap().title, "new");
    }

    #[test]
    fn reset_from_terminal_state_has_nothing_to_cancel() {
        let (mut job, generation) = submitted("https://example.com/video");
        job.complete(generation, Ok(result("done")));
        assert_eq!(job.reset(), None);
        assert_eq!(job.status(), JobStatus::Idle);
        assert_eq!(job.url(), "");
        assert!(job.result().is_none());
    }

    #[test]
    fn blank_metadata_takes_placeholder_values() {
        let mut sparse = result(" ");
        sparse.author = String::new();
        sparse.duration_label = String::new();
        let filled = sparse.with_fallbacks();
        assert_eq!(filled.title, FALLBACK_TITLE);
        assert_eq!(filled.author, FALLBACK_AUTHOR);
        assert_eq!(filled.duration_label, FALLBACK_DURATION);
        assert_eq!(filled.thumbnail_url.as_deref(), Some(FALLBACK_THUMBNAIL));

        let mut complete = result("Clip");
        complete.thumbnail_url = Some("https://img.example.com/t.jpg".into());
        assert_eq!(complete.clone().with_fallbacks(), complete);
    }
}
