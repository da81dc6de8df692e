use crate::{
    AppState, DownloadResult, ExportStatus, FormatId, JobStatus, Platform, SessionStatus, TrimRange,
};

pub const TITLE_SIGNED_IN: &str = "Universal Video Downloader - Fast & Free Online HD Video Saver";
pub const TITLE_SIGNED_OUT: &str = "Login | Universal Video Downloader";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    pub status: SessionStatus,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatChoice {
    pub id: FormatId,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsView {
    pub formats: Vec<FormatChoice>,
    pub selected: FormatId,
    /// Present only while the selected format can be trimmed.
    pub trim: Option<TrimRange>,
    pub download_label: String,
    pub export: ExportStatus,
    pub export_enabled: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub page_title: &'static str,
    pub session: SessionView,
    /// Session not yet known; render a spinner instead of the page.
    pub loading: bool,
    pub url_input: String,
    pub job_status: JobStatus,
    pub submit_enabled: bool,
    pub busy: bool,
    pub platform: Option<Platform>,
    pub result: Option<DownloadResult>,
    pub error_message: Option<String>,
    pub notice: Option<String>,
    pub options: Option<OptionsView>,
    pub dirty: bool,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState, dirty: bool) -> Self {
        let session = state.session();
        let signed_in = session.is_signed_in();
        let job = state.job();

        let options = if job.status() == JobStatus::Succeeded {
            state.options().map(|selection| OptionsView {
                formats: FormatId::ALL
                    .into_iter()
                    .map(|id| FormatChoice {
                        id,
                        label: id.label(),
                        selected: id == selection.format(),
                    })
                    .collect(),
                selected: selection.format(),
                trim: selection.visible_trim().cloned(),
                download_label: selection.download_label(),
                export: selection.export().clone(),
                export_enabled: *selection.export() != ExportStatus::Requested,
                error: selection.error().map(ToOwned::to_owned),
            })
        } else {
            None
        };

        Self {
            page_title: if signed_in {
                TITLE_SIGNED_IN
            } else {
                TITLE_SIGNED_OUT
            },
            session: SessionView {
                status: session.status(),
                display_name: session.identity().map(|id| id.display_name.clone()),
                photo_url: session.identity().and_then(|id| id.photo_url.clone()),
            },
            loading: session.status() == SessionStatus::Unknown,
            url_input: job.url().to_string(),
            job_status: job.status(),
            submit_enabled: signed_in && job.can_submit(),
            busy: job.status() == JobStatus::Submitted,
            platform: Platform::detect(job.url()),
            result: job.result().cloned(),
            error_message: job.error().map(|err| err.message.clone()),
            notice: state.notice().map(ToOwned::to_owned),
            options,
            dirty,
        }
    }
}
