use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use vidgrab_core::{update, AppState, AppViewModel, Lifecycle, Msg};
use vidgrab_engine::{EngineHandle, EngineSettings, IdentityProvider, MediaService};
use vidgrab_logging::{vg_debug, TARGET_HOST};

use crate::config::{ConfigError, HostConfig};
use crate::effects::EffectRunner;

/// Owns the coordinator state and serializes every message through `update`.
///
/// UI code posts messages with [`Host::sender`] (or [`Host::dispatch`] when it
/// is on the host's thread) and calls [`Host::pump`] once per frame to apply
/// pending messages and receive a view model when something changed.
pub struct Host {
    state: AppState,
    runner: EffectRunner,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
}

impl Host {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        media: Arc<dyn MediaService>,
        settings: EngineSettings,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        let engine = EngineHandle::new(identity, media, settings);
        let runner = EffectRunner::new(engine, msg_tx.clone());
        Self {
            state: AppState::new(),
            runner,
            msg_tx,
            msg_rx,
        }
    }

    pub fn from_config(
        config: &HostConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, ConfigError> {
        let media = config.build_media()?;
        Ok(Self::new(identity, media, config.engine_settings()))
    }

    pub fn sender(&self) -> mpsc::Sender<Msg> {
        self.msg_tx.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    /// Attach to the identity provider.
    pub fn mount(&mut self) -> Option<AppViewModel> {
        self.dispatch(Msg::Mounted)
    }

    /// Detach: unsubscribe and cancel whatever is in flight.
    pub fn unmount(&mut self) -> Option<AppViewModel> {
        self.dispatch(Msg::Unmounted)
    }

    /// Apply one message and run its effects. Returns the new view if it changed.
    pub fn dispatch(&mut self, msg: Msg) -> Option<AppViewModel> {
        vg_debug!(target: TARGET_HOST, "dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let view = state.view();
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);
        was_dirty.then_some(view)
    }

    /// Apply every queued message. Returns the latest view if any of them
    /// changed state.
    pub fn pump(&mut self) -> Option<AppViewModel> {
        let mut latest = None;
        while let Ok(msg) = self.msg_rx.try_recv() {
            if let Some(view) = self.dispatch(msg) {
                latest = Some(view);
            }
        }
        latest
    }

    /// Pump until `done` holds for the current view or `timeout` passes.
    pub fn pump_until(
        &mut self,
        timeout: Duration,
        done: impl Fn(&AppViewModel) -> bool,
    ) -> Option<AppViewModel> {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            let view = self.view();
            if done(&view) {
                return Some(view);
            }
            if Instant::now() >= deadline {
                return None;
            }
            match self.msg_rx.recv_timeout(Duration::from_millis(10)) {
                Ok(msg) => {
                    self.dispatch(msg);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        if self.state.lifecycle() == Lifecycle::Mounted {
            self.unmount();
        }
    }
}
