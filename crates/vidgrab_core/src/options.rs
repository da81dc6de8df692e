use std::fmt;

use thiserror::Error;

use crate::job::{DownloadResult, FALLBACK_DURATION};

const DEFAULT_TRIM_START: &str = "00:00";

/// Output formats offered once a video is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormatId {
    Mp4_1080,
    #[default]
    Mp4_720,
    Aac,
    Mp3,
}

impl FormatId {
    pub const ALL: [FormatId; 4] = [
        FormatId::Mp4_1080,
        FormatId::Mp4_720,
        FormatId::Aac,
        FormatId::Mp3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FormatId::Mp4_1080 => "mp4-1080",
            FormatId::Mp4_720 => "mp4-720",
            FormatId::Aac => "aac",
            FormatId::Mp3 => "mp3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormatId::Mp4_1080 => "MP4 1080p",
            FormatId::Mp4_720 => "MP4 720p",
            FormatId::Aac => "AAC Audio",
            FormatId::Mp3 => "MP3 Audio",
        }
    }

    /// Only MP3 exports can be trimmed.
    pub fn supports_trim(self) -> bool {
        self == FormatId::Mp3
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start and end labels as typed by the user, e.g. `"00:30"` / `"01:02:03"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrimError {
    #[error("invalid time {0:?}, expected mm:ss or hh:mm:ss")]
    BadLabel(String),
    #[error("trim start {start} must be before end {end}")]
    EmptyRange { start: String, end: String },
}

/// Parse `mm:ss` or `hh:mm:ss` into seconds. Minutes and seconds must be < 60
/// unless they are the leading field.
pub fn parse_time_label(label: &str) -> Option<u32> {
    let parts: Vec<&str> = label.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    let mut total: u32 = 0;
    for (index, part) in parts.iter().enumerate() {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u32 = part.parse().ok()?;
        if index > 0 && value >= 60 {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(value)?;
    }
    Some(total)
}

impl TrimRange {
    pub fn validate(&self) -> Result<(u32, u32), TrimError> {
        let start =
            parse_time_label(&self.start).ok_or_else(|| TrimError::BadLabel(self.start.clone()))?;
        let end =
            parse_time_label(&self.end).ok_or_else(|| TrimError::BadLabel(self.end.clone()))?;
        if start >= end {
            return Err(TrimError::EmptyRange {
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }
        Ok((start, end))
    }
}

/// Receipt for an export accepted by the media service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTicket {
    pub export_id: String,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportStatus {
    #[default]
    Idle,
    Requested,
    Started(ExportTicket),
    Failed(String),
}

/// The payload handed to the export collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: FormatId,
    pub trim: Option<TrimRange>,
}

/// Local selection state of the options panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelection {
    format: FormatId,
    trim: TrimRange,
    export: ExportStatus,
    error: Option<String>,
}

impl Default for FormatSelection {
    fn default() -> Self {
        Self {
            format: FormatId::default(),
            trim: TrimRange {
                start: DEFAULT_TRIM_START.to_string(),
                end: FALLBACK_DURATION.to_string(),
            },
            export: ExportStatus::Idle,
            error: None,
        }
    }
}

impl FormatSelection {
    /// Fresh selection for a newly resolved video.
    pub fn for_result(result: &DownloadResult) -> Self {
        let end = if result.duration_label.trim().is_empty() {
            FALLBACK_DURATION.to_string()
        } else {
            result.duration_label.trim().to_string()
        };
        Self {
            trim: TrimRange {
                start: DEFAULT_TRIM_START.to_string(),
                end,
            },
            ..Self::default()
        }
    }

    pub fn format(&self) -> FormatId {
        self.format
    }

    pub fn export(&self) -> &ExportStatus {
        &self.export
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Trim values as stored, regardless of visibility.
    pub fn trim(&self) -> &TrimRange {
        &self.trim
    }

    /// Trim values, observable only while the selected format supports trimming.
    pub fn visible_trim(&self) -> Option<&TrimRange> {
        self.format.supports_trim().then_some(&self.trim)
    }

    pub fn select(&mut self, format: FormatId) -> bool {
        if self.format == format {
            return false;
        }
        self.format = format;
        self.error = None;
        true
    }

    pub fn set_trim_start(&mut self, start: String) -> bool {
        if self.trim.start == start {
            return false;
        }
        self.trim.start = start;
        self.error = None;
        true
    }

    pub fn set_trim_end(&mut self, end: String) -> bool {
        if self.trim.end == end {
            return false;
        }
        self.trim.end = end;
        self.error = None;
        true
    }

    pub fn download_label(&self) -> String {
        format!("Download {}", self.format.as_str().to_ascii_uppercase())
    }

    /// Build the export payload and mark it requested. Trim only travels for
    /// formats that support it. Returns `None` while an export is pending.
    pub fn begin_export(&mut self) -> Option<Result<ExportRequest, TrimError>> {
        if self.export == ExportStatus::Requested {
            return None;
        }
        let trim = match self.visible_trim() {
            Some(trim) => match trim.validate() {
                Ok(_) => Some(trim.clone()),
                Err(err) => {
                    self.error = Some(err.to_string());
                    return Some(Err(err));
                }
            },
            None => None,
        };
        self.error = None;
        self.export = ExportStatus::Requested;
        Some(Ok(ExportRequest {
            format: self.format,
            trim,
        }))
    }

    /// Apply the collaborator's answer. Ignored unless an export is pending.
    pub fn finish_export(&mut self, outcome: Result<ExportTicket, String>) -> bool {
        if self.export != ExportStatus::Requested {
            return false;
        }
        self.export = match outcome {
            Ok(ticket) => ExportStatus::Started(ticket),
            Err(message) => ExportStatus::Failed(message),
        };
        true
    }
}
