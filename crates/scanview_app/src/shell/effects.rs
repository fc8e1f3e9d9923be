use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use engine_logging::{engine_info, engine_warn};
use scanview_core::{DatasetMap, Effect, Msg, QueryError, Route};
use scanview_engine::{ClientSettings, CompileOutcome, EngineEvent, EngineHandle, SubmitOutcome};

pub struct EffectRunner {
    engine: EngineHandle,
    location: Route,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings, msg_tx: mpsc::Sender<Msg>) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();
        let engine = EngineHandle::new(settings, event_tx).context("starting engine")?;
        spawn_event_loop(event_rx, msg_tx);
        Ok(Self {
            engine,
            location: Route::Compose,
        })
    }

    /// Where the session currently points; updated by `Effect::Navigate`.
    pub fn location(&self) -> &Route {
        &self.location
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Navigate(route) => {
                    engine_info!("Navigate {}", route.path());
                    self.location = route;
                }
                Effect::FetchDatasets => self.engine.fetch_datasets(),
                Effect::FetchJobQuery { hash } => self.engine.fetch_job_query(hash),
                Effect::FetchMatches {
                    ticket,
                    offset,
                    limit,
                } => self.engine.fetch_matches(ticket, offset, limit),
                Effect::SchedulePoll { ticket, delay } => self.engine.schedule_poll(ticket, delay),
                Effect::CancelPoll => self.engine.cancel_poll(),
                Effect::CompileQuery { raw_query, taint } => {
                    engine_info!("CompileQuery len={} taint={:?}", raw_query.len(), taint);
                    self.engine.compile(raw_query, taint);
                }
                Effect::SubmitQuery { raw_query, taint } => {
                    engine_info!("SubmitQuery len={} taint={:?}", raw_query.len(), taint);
                    self.engine.submit(raw_query, taint);
                }
                Effect::FetchBackendStatus => self.engine.fetch_backend_status(),
            }
        }
    }
}

fn spawn_event_loop(event_rx: mpsc::Receiver<EngineEvent>, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        for event in event_rx {
            if msg_tx.send(map_event(event)).is_err() {
                break;
            }
        }
    });
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::DatasetsLoaded(Ok(datasets)) => Msg::DatasetsLoaded(datasets),
        EngineEvent::DatasetsLoaded(Err(err)) => {
            engine_warn!("Failed to load datasets: {}", err);
            Msg::DatasetsLoaded(DatasetMap::new())
        }
        EngineEvent::JobQueryLoaded { hash, result } => match result {
            Ok(raw_query) => Msg::JobQueryLoaded { hash, raw_query },
            Err(err) => Msg::JobQueryFailed {
                hash,
                reason: err.to_string(),
            },
        },
        EngineEvent::MatchesLoaded { ticket, result } => match result {
            Ok(page) => Msg::MatchesLoaded { ticket, page },
            Err(err) => Msg::MatchesFailed {
                ticket,
                reason: err.to_string(),
            },
        },
        EngineEvent::PollDue { ticket } => Msg::PollDue { ticket },
        EngineEvent::QueryCompiled { raw_query, result } => match result {
            Ok(CompileOutcome::Plan(plan)) => Msg::QueryCompiled { plan, raw_query },
            Ok(CompileOutcome::Rejected(error)) => Msg::QueryFailed { error, raw_query },
            Err(err) => Msg::QueryFailed {
                error: QueryError::new(err.to_string()),
                raw_query,
            },
        },
        EngineEvent::QuerySubmitted { raw_query, result } => match result {
            Ok(SubmitOutcome::Accepted(hash)) => Msg::QuerySubmitted { hash, raw_query },
            Ok(SubmitOutcome::Rejected(error)) => Msg::QueryFailed { error, raw_query },
            Err(err) => Msg::QueryFailed {
                error: QueryError::new(err.to_string()),
                raw_query,
            },
        },
        EngineEvent::BackendStatusLoaded(Ok(status)) => Msg::BackendStatusLoaded(status),
        EngineEvent::BackendStatusLoaded(Err(err)) => Msg::BackendStatusFailed {
            reason: err.to_string(),
        },
    }
}
