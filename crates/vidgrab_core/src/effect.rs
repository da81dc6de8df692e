use crate::{FormatId, Generation, JobHandle, TrimRange};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubscribeSession,
    UnsubscribeSession,
    SignIn,
    SignOut,
    SubmitDownload {
        generation: Generation,
        url: String,
    },
    CancelDownload {
        generation: Generation,
    },
    RequestExport {
        generation: Generation,
        job: JobHandle,
        format: FormatId,
        trim: Option<TrimRange>,
    },
}
