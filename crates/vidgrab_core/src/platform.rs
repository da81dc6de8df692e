use thiserror::Error;
use url::Url;

/// Why a URL was refused before a job was started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("paste a video URL first")]
    Empty,
    #[error("not a valid URL: {0}")]
    Invalid(String),
    #[error("unsupported URL scheme {0:?}, use http or https")]
    UnsupportedScheme(String),
}

/// Platforms the landing page advertises. Other hosts are still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Facebook,
    Instagram,
    YouTube,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::YouTube,
        Platform::TikTok,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::YouTube => "YouTube",
            Platform::TikTok => "TikTok",
        }
    }

    fn domains(self) -> &'static [&'static str] {
        match self {
            Platform::Facebook => &["facebook.com", "fb.watch"],
            Platform::Instagram => &["instagram.com"],
            Platform::YouTube => &["youtube.com", "youtu.be"],
            Platform::TikTok => &["tiktok.com"],
        }
    }

    /// Best-effort detection from raw input; `None` for unknown hosts or bad URLs.
    pub fn detect(raw: &str) -> Option<Platform> {
        let url = Url::parse(raw.trim()).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();
        Platform::ALL.into_iter().find(|platform| {
            platform
                .domains()
                .iter()
                .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
        })
    }
}

/// Validate user input as an absolute http(s) URL.
pub fn validate_url(raw: &str) -> Result<Url, SubmissionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SubmissionError::Empty);
    }
    let url = Url::parse(trimmed).map_err(|err| SubmissionError::Invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(SubmissionError::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(SubmissionError::Invalid("missing host".to_string()));
    }
    Ok(url)
}
