//! Vidgrab engine: collaborator boundaries and asynchronous effect execution.
mod engine;
mod http;
mod identity;
mod media;
mod runner;
mod types;

pub use engine::{EngineHandle, EngineSettings};
pub use http::{HttpMediaService, HttpSettings};
pub use identity::{IdentityProvider, LocalIdentityProvider, SessionSink, Subscription};
pub use media::{MediaService, SimulatedMediaService, SIMULATED_DELAY};
pub use runner::{run_download, with_retry, PollSettings, RetryPolicy};
pub use types::{
    AuthError, EngineEvent, ExportHandle, ExportSpec, FailureKind, Generation, Identity,
    JobHandle, JobState, MediaMetadata, ServiceError,
};
