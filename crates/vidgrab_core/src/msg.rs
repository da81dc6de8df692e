use crate::{AuthError, DownloadResult, ExportTicket, FormatId, Generation, Identity, JobError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The coordinator view was attached; start watching the session.
    Mounted,
    /// The coordinator view is going away; stop all state writes.
    Unmounted,
    /// Identity provider reported a session change (`None` = signed out).
    SessionChanged(Option<Identity>),
    /// User clicked "Sign in".
    SignInClicked,
    /// Interactive sign-in failed or was dismissed.
    SignInFailed(AuthError),
    /// User clicked "Sign out".
    SignOutClicked,
    /// User edited the URL input box.
    UrlChanged(String),
    /// User submitted the current URL.
    SubmitClicked,
    /// Media service finished (or gave up on) the job for `generation`.
    DownloadFinished {
        generation: Generation,
        result: Result<DownloadResult, JobError>,
    },
    /// User clicked "Download another" / "Try again".
    ResetClicked,
    /// User picked an output format.
    FormatSelected(FormatId),
    TrimStartChanged(String),
    TrimEndChanged(String),
    /// User clicked the download button of the options panel.
    ExportClicked,
    /// Media service answered the export request for `generation`.
    ExportFinished {
        generation: Generation,
        result: Result<ExportTicket, JobError>,
    },
}
