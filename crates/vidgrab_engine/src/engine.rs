use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use vidgrab_logging::{vg_debug, vg_info, vg_warn, TARGET_ENGINE};

use crate::identity::{IdentityProvider, SessionSink, Subscription};
use crate::media::MediaService;
use crate::runner::{run_download, PollSettings, RetryPolicy};
use crate::{EngineEvent, ExportSpec, Generation, Identity, JobHandle};

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub poll: PollSettings,
    pub retry: RetryPolicy,
}

enum EngineCommand {
    Subscribe,
    Unsubscribe,
    SignIn,
    SignOut,
    Submit {
        generation: Generation,
        url: String,
    },
    Cancel {
        generation: Generation,
    },
    Export {
        generation: Generation,
        job: JobHandle,
        spec: ExportSpec,
    },
}

/// Handle to the engine thread. Commands go in, [`EngineEvent`]s come out.
/// The thread and its runtime stop once every handle is dropped.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

struct ChannelSessionSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl SessionSink for ChannelSessionSink {
    fn session_changed(&self, identity: Option<Identity>) {
        let _ = self.tx.send(EngineEvent::SessionChanged(identity));
    }
}

struct Collaborators {
    identity: Arc<dyn IdentityProvider>,
    media: Arc<dyn MediaService>,
    settings: EngineSettings,
    event_tx: mpsc::Sender<EngineEvent>,
    in_flight: Arc<Mutex<HashMap<Generation, CancellationToken>>>,
}

impl EngineHandle {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        media: Arc<dyn MediaService>,
        settings: EngineSettings,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let collaborators = Collaborators {
            identity,
            media,
            settings,
            event_tx,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        };

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut subscription: Option<Subscription> = None;
            while let Ok(command) = cmd_rx.recv() {
                handle_command(&runtime, &collaborators, &mut subscription, command);
            }
            vg_debug!(target: TARGET_ENGINE, "Engine command channel closed");
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn subscribe_session(&self) {
        self.send(EngineCommand::Subscribe);
    }

    pub fn unsubscribe_session(&self) {
        self.send(EngineCommand::Unsubscribe);
    }

    pub fn sign_in(&self) {
        self.send(EngineCommand::SignIn);
    }

    pub fn sign_out(&self) {
        self.send(EngineCommand::SignOut);
    }

    pub fn submit(&self, generation: Generation, url: impl Into<String>) {
        self.send(EngineCommand::Submit {
            generation,
            url: url.into(),
        });
    }

    pub fn cancel(&self, generation: Generation) {
        self.send(EngineCommand::Cancel { generation });
    }

    pub fn export(&self, generation: Generation, job: JobHandle, spec: ExportSpec) {
        self.send(EngineCommand::Export {
            generation,
            job,
            spec,
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_recv()
            .ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv_timeout(timeout)
            .ok()
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    ctx: &Collaborators,
    subscription: &mut Option<Subscription>,
    command: EngineCommand,
) {
    match command {
        EngineCommand::Subscribe => {
            if subscription.is_some() {
                return;
            }
            let sink = Arc::new(ChannelSessionSink {
                tx: ctx.event_tx.clone(),
            });
            *subscription = Some(runtime.block_on(ctx.identity.subscribe(sink)));
            vg_info!(target: TARGET_ENGINE, "Subscribed to session changes");
        }
        EngineCommand::Unsubscribe => {
            if let Some(active) = subscription.take() {
                active.unsubscribe();
                vg_info!(target: TARGET_ENGINE, "Unsubscribed from session changes");
            }
        }
        EngineCommand::SignIn => {
            let identity = ctx.identity.clone();
            let event_tx = ctx.event_tx.clone();
            runtime.spawn(async move {
                if let Err(err) = identity.sign_in_interactive().await {
                    let _ = event_tx.send(EngineEvent::SignInFailed(err));
                }
            });
        }
        EngineCommand::SignOut => {
            let identity = ctx.identity.clone();
            let event_tx = ctx.event_tx.clone();
            runtime.spawn(async move {
                if let Err(err) = identity.sign_out().await {
                    vg_warn!(target: TARGET_ENGINE, "Sign-out failed: {err}");
                    let _ = event_tx.send(EngineEvent::SignOutFailed(err));
                }
            });
        }
        EngineCommand::Submit { generation, url } => {
            let token = CancellationToken::new();
            if let Some(previous) = lock(&ctx.in_flight).insert(generation, token.clone()) {
                previous.cancel();
            }
            let media = ctx.media.clone();
            let settings = ctx.settings.clone();
            let event_tx = ctx.event_tx.clone();
            let in_flight = ctx.in_flight.clone();
            runtime.spawn(async move {
                let outcome = tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    result = run_download(media.as_ref(), &url, &settings.poll, &settings.retry) => Some(result),
                };
                lock(&in_flight).remove(&generation);
                match outcome {
                    Some(result) => {
                        if let Err(err) = &result {
                            vg_warn!(target: TARGET_ENGINE, "Job generation={generation} failed: {err}");
                        }
                        let _ = event_tx.send(EngineEvent::JobCompleted { generation, result });
                    }
                    None => {
                        vg_debug!(target: TARGET_ENGINE, "Job generation={generation} cancelled");
                    }
                }
            });
        }
        EngineCommand::Cancel { generation } => {
            if let Some(token) = lock(&ctx.in_flight).remove(&generation) {
                token.cancel();
            }
        }
        EngineCommand::Export {
            generation,
            job,
            spec,
        } => {
            let media = ctx.media.clone();
            let event_tx = ctx.event_tx.clone();
            runtime.spawn(async move {
                let result = media.request_export(&job, &spec).await;
                let _ = event_tx.send(EngineEvent::ExportCompleted { generation, result });
            });
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
