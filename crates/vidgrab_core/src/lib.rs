//! Vidgrab core: pure session/job state machine and view-model helpers.
mod effect;
mod job;
mod msg;
mod options;
mod platform;
mod session;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use job::{
    Completion, DownloadResult, Generation, JobError, JobHandle, JobMachine, JobStatus,
    SubmitRejection, FALLBACK_AUTHOR, FALLBACK_DURATION, FALLBACK_THUMBNAIL, FALLBACK_TITLE,
};
pub use msg::Msg;
pub use options::{
    parse_time_label, ExportRequest, ExportStatus, ExportTicket, FormatId, FormatSelection,
    TrimError, TrimRange,
};
pub use platform::{validate_url, Platform, SubmissionError};
pub use session::{AuthError, Identity, Session, SessionStatus};
pub use state::{AppState, Lifecycle};
pub use update::update;
pub use view_model::{
    AppViewModel, FormatChoice, OptionsView, SessionView, TITLE_SIGNED_IN, TITLE_SIGNED_OUT,
};
