use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use anyhow::Result;
use engine_logging::{engine_debug, engine_warn};
use scanview_core::{update, AppState, AppViewModel, Msg, PollStatus, Route};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::render;

/// Throttles how often an idle session re-checks its goal.
const TICK: Duration = Duration::from_millis(75);

/// What the session is run for; decides when it may end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Goal {
    /// List the taints offered by the composer.
    Browse,
    /// Follow the job named in the location until it is drained.
    Watch,
    Compile {
        raw_query: String,
        taint: Option<String>,
    },
    Submit {
        raw_query: String,
        taint: Option<String>,
    },
    Backend,
}

impl Goal {
    fn initial_msg(&self) -> Option<Msg> {
        match self {
            Goal::Browse | Goal::Watch => None,
            Goal::Compile { raw_query, taint } => Some(Msg::CompileRequested {
                raw_query: raw_query.clone(),
                taint: taint.clone(),
            }),
            Goal::Submit { raw_query, taint } => Some(Msg::SubmitRequested {
                raw_query: raw_query.clone(),
                taint: taint.clone(),
            }),
            Goal::Backend => Some(Msg::BackendStatusRequested),
        }
    }

    pub fn is_reached(&self, view: &AppViewModel) -> bool {
        let drained = matches!(view.poll, PollStatus::Finished | PollStatus::Stalled { .. });
        match self {
            Goal::Browse => view.datasets_loaded,
            Goal::Watch => drained,
            Goal::Compile { .. } => view.query_plan.is_some() || view.query_error.is_some(),
            Goal::Submit { .. } => {
                drained || (view.job_hash.is_none() && view.query_error.is_some())
            }
            Goal::Backend => view.db_alive.is_some() || view.backend_error.is_some(),
        }
    }
}

pub struct Session {
    state: AppState,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
    last_status: Option<String>,
}

impl Session {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let (msg_tx, msg_rx) = mpsc::channel();
        let runner = EffectRunner::new(config.client.to_settings(), msg_tx)?;
        Ok(Self {
            state: AppState::with_poll_settings(config.poll.clone()),
            runner,
            msg_rx,
            last_status: None,
        })
    }

    /// Mounts `route`, pumps messages until `goal` is reached, then unmounts.
    ///
    /// Returns the last view seen before unmounting.
    pub fn run(mut self, route: Route, goal: &Goal) -> AppViewModel {
        self.dispatch(Msg::Mounted { route });
        if let Some(msg) = goal.initial_msg() {
            self.dispatch(msg);
        }

        let mut view = self.state.view();
        while !goal.is_reached(&view) {
            let msg = match self.msg_rx.recv_timeout(TICK) {
                Ok(msg) => msg,
                Err(RecvTimeoutError::Timeout) => Msg::Tick,
                Err(RecvTimeoutError::Disconnected) => {
                    engine_warn!("Engine stopped before the session finished");
                    break;
                }
            };
            if let Some(next) = self.dispatch(msg) {
                view = next;
            }
        }

        self.dispatch(Msg::Unmounted);
        engine_debug!("Session ended at {}", self.runner.location().path());
        view
    }

    fn dispatch(&mut self, msg: Msg) -> Option<AppViewModel> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);
        let view = state.consume_dirty().then(|| state.view());
        self.state = state;

        if let Some(view) = &view {
            self.render_status(view);
        }
        view
    }

    fn render_status(&mut self, view: &AppViewModel) {
        let line = render::status_line(view);
        if self.last_status.as_deref() != Some(line.as_str()) {
            eprintln!("{line}");
            self.last_status = Some(line);
        }
    }
}
