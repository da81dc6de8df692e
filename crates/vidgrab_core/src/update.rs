use vidgrab_logging::{vg_debug, vg_info, vg_warn, TARGET_CORE};

use crate::job::{Completion, SubmitRejection};
use crate::{AppState, DownloadResult, Effect, FormatSelection, Lifecycle, Msg, Session};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted => {
            if state.is_mounted() {
                return (state, Vec::new());
            }
            state.mount();
            vec![Effect::SubscribeSession]
        }
        Msg::Unmounted => {
            if !state.is_mounted() {
                return (state, Vec::new());
            }
            let mut effects = vec![Effect::UnsubscribeSession];
            if let Some(generation) = state.tear_down() {
                effects.push(Effect::CancelDownload { generation });
            }
            effects
        }
        // Nothing below may touch state once the view is detached.
        _ if state.lifecycle() != Lifecycle::Mounted => {
            vg_debug!(target: TARGET_CORE, "Dropping {msg:?}: coordinator not mounted");
            Vec::new()
        }
        Msg::SessionChanged(identity) => {
            let cancelled = state.replace_session(Session::from_provider(identity));
            cancel_effect(cancelled)
        }
        Msg::SignInClicked => {
            if state.session().is_signed_in() {
                Vec::new()
            } else {
                vec![Effect::SignIn]
            }
        }
        Msg::SignInFailed(err) => {
            vg_warn!(target: TARGET_CORE, "Sign-in failed: {err}");
            Vec::new()
        }
        Msg::SignOutClicked => {
            if !state.session().is_signed_in() {
                return (state, Vec::new());
            }
            // Job state goes first so nothing survives the session boundary,
            // even if the provider is slow to confirm.
            let mut effects = cancel_effect(state.clear_job());
            effects.push(Effect::SignOut);
            effects
        }
        Msg::UrlChanged(url) => {
            if state.session().is_signed_in() && state.job_mut().set_url(url) {
                state.set_notice(None);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SubmitClicked => {
            if !state.session().is_signed_in() {
                return (state, Vec::new());
            }
            match state.job_mut().submit() {
                Ok((generation, url)) => {
                    vg_info!(target: TARGET_CORE, "Submitting generation={generation} url={url}");
                    state.set_notice(None);
                    state.set_options(None);
                    vec![Effect::SubmitDownload { generation, url }]
                }
                Err(SubmitRejection::NotIdle(status)) => {
                    vg_debug!(target: TARGET_CORE, "Ignoring submit while {status:?}");
                    Vec::new()
                }
                Err(SubmitRejection::Invalid(err)) => {
                    vg_debug!(target: TARGET_CORE, "Rejected submission: {err}");
                    state.set_notice(Some(err.to_string()));
                    Vec::new()
                }
            }
        }
        Msg::DownloadFinished { generation, result } => {
            let result = result.map(DownloadResult::with_fallbacks);
            match state.job_mut().complete(generation, result) {
                Completion::Stale => {
                    vg_debug!(target: TARGET_CORE, "Ignoring stale completion generation={generation}");
                }
                Completion::Succeeded => {
                    let selection = state.job().result().map(FormatSelection::for_result);
                    state.set_options(selection);
                }
                Completion::Failed => {
                    if let Some(err) = state.job().error() {
                        vg_warn!(target: TARGET_CORE, "Job generation={generation} failed: {err}");
                    }
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        Msg::ResetClicked => cancel_effect(state.clear_job()),
        Msg::FormatSelected(format) => {
            if state.options_mut().is_some_and(|sel| sel.select(format)) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TrimStartChanged(start) => {
            if state.options_mut().is_some_and(|sel| sel.set_trim_start(start)) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TrimEndChanged(end) => {
            if state.options_mut().is_some_and(|sel| sel.set_trim_end(end)) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ExportClicked => {
            let generation = state.job().generation();
            let Some(job) = state.job().result().map(|result| result.job.clone()) else {
                return (state, Vec::new());
            };
            let Some(outcome) = state.options_mut().and_then(FormatSelection::begin_export)
            else {
                return (state, Vec::new());
            };
            state.mark_dirty();
            match outcome {
                Ok(request) => {
                    vg_info!(
                        target: TARGET_CORE,
                        "Requesting export format={} trim={:?}",
                        request.format,
                        request.trim
                    );
                    vec![Effect::RequestExport {
                        generation,
                        job,
                        format: request.format,
                        trim: request.trim,
                    }]
                }
                Err(err) => {
                    vg_debug!(target: TARGET_CORE, "Rejected export: {err}");
                    Vec::new()
                }
            }
        }
        Msg::ExportFinished { generation, result } => {
            if generation != state.job().generation() {
                vg_debug!(target: TARGET_CORE, "Ignoring stale export generation={generation}");
                return (state, Vec::new());
            }
            let outcome = result.map_err(|err| err.message);
            if state
                .options_mut()
                .is_some_and(|sel| sel.finish_export(outcome))
            {
                state.mark_dirty();
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn cancel_effect(cancelled: Option<crate::Generation>) -> Vec<Effect> {
    cancelled
        .map(|generation| vec![Effect::CancelDownload { generation }])
        .unwrap_or_default()
}
