use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use vidgrab_core::{
    AuthError, DownloadResult, Effect, ExportTicket, Identity, JobError, JobHandle, Msg,
};
use vidgrab_engine::{EngineEvent, EngineHandle, ExportSpec, FailureKind, ServiceError};
use vidgrab_logging::{vg_info, vg_warn, TARGET_HOST};

/// Executes core effects on the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    stop: Arc<AtomicBool>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self {
            engine,
            stop: Arc::new(AtomicBool::new(false)),
        };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubscribeSession => self.engine.subscribe_session(),
                Effect::UnsubscribeSession => self.engine.unsubscribe_session(),
                Effect::SignIn => self.engine.sign_in(),
                Effect::SignOut => self.engine.sign_out(),
                Effect::SubmitDownload { generation, url } => {
                    vg_info!(
                        target: TARGET_HOST,
                        "SubmitDownload generation={} url_len={} url={}",
                        generation,
                        url.len(),
                        url
                    );
                    self.engine.submit(generation, url);
                }
                Effect::CancelDownload { generation } => {
                    vg_info!(target: TARGET_HOST, "CancelDownload generation={}", generation);
                    self.engine.cancel(generation);
                }
                Effect::RequestExport {
                    generation,
                    job,
                    format,
                    trim,
                } => {
                    vg_info!(
                        target: TARGET_HOST,
                        "RequestExport generation={} job={} format={}",
                        generation,
                        job.as_str(),
                        format
                    );
                    let spec = ExportSpec {
                        format: format.as_str().to_string(),
                        trim: trim.map(|range| (range.start, range.end)),
                    };
                    self.engine
                        .export(generation, vidgrab_engine::JobHandle(job.0), spec);
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        let stop = self.stop.clone();
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                let Some(event) = engine.recv_timeout(Duration::from_millis(20)) else {
                    continue;
                };
                let Some(msg) = map_event(event) else {
                    continue;
                };
                if msg_tx.send(msg).is_err() {
                    break;
                }
            }
        });
    }
}

impl Drop for EffectRunner {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::SessionChanged(identity) => Some(Msg::SessionChanged(
            identity.map(|id| Identity::new(id.display_name, id.photo_url)),
        )),
        EngineEvent::SignInFailed(err) => Some(Msg::SignInFailed(map_auth_error(err))),
        EngineEvent::SignOutFailed(err) => {
            vg_warn!(target: TARGET_HOST, "Provider sign-out failed: {}", err);
            None
        }
        EngineEvent::JobCompleted { generation, result } => Some(Msg::DownloadFinished {
            generation,
            result: result
                .map(|(job, metadata)| DownloadResult {
                    job: JobHandle(job.0),
                    title: metadata.title,
                    author: metadata.author,
                    duration_label: metadata.duration_label,
                    thumbnail_url: metadata.thumbnail_url,
                })
                .map_err(job_error),
        }),
        EngineEvent::ExportCompleted { generation, result } => Some(Msg::ExportFinished {
            generation,
            result: result
                .map(|handle| ExportTicket {
                    export_id: handle.export_id,
                    download_url: handle.download_url,
                })
                .map_err(job_error),
        }),
    }
}

fn map_auth_error(err: vidgrab_engine::AuthError) -> AuthError {
    match err {
        vidgrab_engine::AuthError::Dismissed => AuthError::Dismissed,
        vidgrab_engine::AuthError::Denied(reason) => AuthError::Denied(reason),
        vidgrab_engine::AuthError::Provider(reason) => AuthError::Provider(reason),
    }
}

/// User-facing message for a service failure.
fn job_error(err: ServiceError) -> JobError {
    match err.kind {
        FailureKind::Rejected if !err.message.trim().is_empty() => JobError::new(err.message),
        _ => JobError::new(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidgrab_engine::MediaMetadata;

    #[test]
    fn rejected_jobs_show_the_service_message() {
        let err = ServiceError::new(FailureKind::Rejected, "unsupported platform");
        assert_eq!(job_error(err).message, "unsupported platform");

        let err = ServiceError::new(FailureKind::Rejected, "");
        assert_eq!(job_error(err).message, "download failed");

        let err = ServiceError::new(FailureKind::HttpStatus(500), "oops");
        assert_eq!(job_error(err).message, "http status 500: oops");
    }

    #[test]
    fn completed_jobs_map_to_download_results() {
        let msg = map_event(EngineEvent::JobCompleted {
            generation: 4,
            result: Ok((
                vidgrab_engine::JobHandle("j".into()),
                MediaMetadata {
                    title: "T".into(),
                    author: "A".into(),
                    duration_label: "01:00".into(),
                    thumbnail_url: None,
                },
            )),
        });
        assert_eq!(
            msg,
            Some(Msg::DownloadFinished {
                generation: 4,
                result: Ok(DownloadResult {
                    job: JobHandle("j".into()),
                    title: "T".into(),
                    author: "A".into(),
                    duration_label: "01:00".into(),
                    thumbnail_url: None,
                }),
            })
        );
    }

    #[test]
    fn sign_out_failures_are_only_logged() {
        assert_eq!(
            map_event(EngineEvent::SignOutFailed(
                vidgrab_engine::AuthError::Provider("offline".into())
            )),
            None
        );
    }
}
