use crate::job::{Generation, JobMachine};
use crate::options::FormatSelection;
use crate::session::Session;
use crate::view_model::AppViewModel;

/// Whether the coordinator is attached to its session subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Detached,
    Mounted,
    TornDown,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    lifecycle: Lifecycle,
    session: Session,
    job: JobMachine,
    options: Option<FormatSelection>,
    notice: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn job(&self) -> &JobMachine {
        &self.job
    }

    pub fn options(&self) -> Option<&FormatSelection> {
        self.options.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self, self.dirty)
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    pub(crate) fn mount(&mut self) {
        self.lifecycle = Lifecycle::Mounted;
        self.session = Session::Unknown;
        self.mark_dirty();
    }

    pub(crate) fn tear_down(&mut self) -> Option<Generation> {
        self.lifecycle = Lifecycle::TornDown;
        self.clear_job()
    }

    /// Swap in a new session; returns the in-flight generation if the swap
    /// crossed a session boundary and cancelled a job.
    pub(crate) fn replace_session(&mut self, next: Session) -> Option<Generation> {
        let cancelled = if self.session.crosses_boundary(&next) {
            self.clear_job()
        } else {
            None
        };
        if self.session != next {
            self.session = next;
            self.mark_dirty();
        }
        cancelled
    }

    /// Drop all job and options state. Returns the generation that was in flight.
    pub(crate) fn clear_job(&mut self) -> Option<Generation> {
        let before = self.job.clone();
        let cancelled = self.job.reset();
        let had_options = self.options.take().is_some();
        let had_notice = self.notice.take().is_some();
        if had_options || had_notice || self.job != before {
            self.mark_dirty();
        }
        cancelled
    }

    pub(crate) fn job_mut(&mut self) -> &mut JobMachine {
        &mut self.job
    }

    pub(crate) fn options_mut(&mut self) -> Option<&mut FormatSelection> {
        self.options.as_mut()
    }

    pub(crate) fn set_options(&mut self, options: Option<FormatSelection>) {
        self.options = options;
        self.mark_dirty();
    }

    pub(crate) fn set_notice(&mut self, notice: Option<String>) {
        if self.notice != notice {
            self.notice = notice;
            self.mark_dirty();
        }
    }
}
