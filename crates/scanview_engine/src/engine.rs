use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_trace};
use scanview_core::{JobHash, PollTicket};
use thiserror::Error;

use crate::client::{ApiClient, ClientSettings, ReqwestApiClient};
use crate::scheduler::PollScheduler;
use crate::sink::{ChannelEventSink, EventSink};
use crate::{ApiError, EngineEvent};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("api client: {0}")]
    Client(#[from] ApiError),
    #[error("tokio runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum EngineCommand {
    FetchDatasets,
    FetchJobQuery {
        hash: JobHash,
    },
    FetchMatches {
        ticket: PollTicket,
        offset: usize,
        limit: usize,
    },
    SchedulePoll {
        ticket: PollTicket,
        delay: Duration,
    },
    CancelPoll,
    Compile {
        raw_query: String,
        taint: Option<String>,
    },
    Submit {
        raw_query: String,
        taint: Option<String>,
    },
    FetchBackendStatus,
}

/// Runs API requests and poll timers on a background tokio runtime.
///
/// Results come back as `EngineEvent`s on the channel given at construction.
/// Dropping the handle stops the worker thread and cancels pending timers.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(
        settings: ClientSettings,
        event_tx: mpsc::Sender<EngineEvent>,
    ) -> Result<Self, EngineError> {
        let client = ReqwestApiClient::new(settings)?;
        Self::with_client(Arc::new(client), event_tx)
    }

    pub fn with_client(
        client: Arc<dyn ApiClient>,
        event_tx: mpsc::Sender<EngineEvent>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        thread::spawn(move || {
            let scheduler = PollScheduler::new();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    // Timer bookkeeping stays on this thread so cancel and
                    // schedule are applied in the order they were issued.
                    EngineCommand::SchedulePoll { ticket, delay } => {
                        let _guard = runtime.enter();
                        engine_trace!("Next poll for {} in {:?}", ticket.hash, delay);
                        scheduler.schedule(ticket, delay, sink.clone());
                    }
                    EngineCommand::CancelPoll => scheduler.cancel(),
                    command => {
                        let client = client.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            handle_command(client.as_ref(), command, sink.as_ref()).await;
                        });
                    }
                }
            }
            scheduler.cancel();
            engine_debug!("Engine command channel closed");
        });

        Ok(Self { cmd_tx })
    }

    pub fn fetch_datasets(&self) {
        self.send(EngineCommand::FetchDatasets);
    }

    pub fn fetch_job_query(&self, hash: JobHash) {
        self.send(EngineCommand::FetchJobQuery { hash });
    }

    pub fn fetch_matches(&self, ticket: PollTicket, offset: usize, limit: usize) {
        self.send(EngineCommand::FetchMatches {
            ticket,
            offset,
            limit,
        });
    }

    pub fn schedule_poll(&self, ticket: PollTicket, delay: Duration) {
        self.send(EngineCommand::SchedulePoll { ticket, delay });
    }

    pub fn cancel_poll(&self) {
        self.send(EngineCommand::CancelPoll);
    }

    pub fn compile(&self, raw_query: String, taint: Option<String>) {
        self.send(EngineCommand::Compile { raw_query, taint });
    }

    pub fn submit(&self, raw_query: String, taint: Option<String>) {
        self.send(EngineCommand::Submit { raw_query, taint });
    }

    pub fn fetch_backend_status(&self) {
        self.send(EngineCommand::FetchBackendStatus);
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn handle_command(client: &dyn ApiClient, command: EngineCommand, sink: &dyn EventSink) {
    let event = match command {
        EngineCommand::FetchDatasets => EngineEvent::DatasetsLoaded(client.datasets().await),
        EngineCommand::FetchJobQuery { hash } => {
            let result = client.job_query(&hash).await;
            EngineEvent::JobQueryLoaded { hash, result }
        }
        EngineCommand::FetchMatches {
            ticket,
            offset,
            limit,
        } => {
            engine_trace!("Fetching matches {} [{}, +{})", ticket.hash, offset, limit);
            let result = client.matches(&ticket.hash, offset, limit).await;
            EngineEvent::MatchesLoaded { ticket, result }
        }
        EngineCommand::Compile { raw_query, taint } => {
            let result = client.compile(&raw_query, taint.as_deref()).await;
            EngineEvent::QueryCompiled { raw_query, result }
        }
        EngineCommand::Submit { raw_query, taint } => {
            let result = client.submit(&raw_query, taint.as_deref()).await;
            EngineEvent::QuerySubmitted { raw_query, result }
        }
        EngineCommand::FetchBackendStatus => {
            EngineEvent::BackendStatusLoaded(client.backend_status().await)
        }
        EngineCommand::SchedulePoll { .. } | EngineCommand::CancelPoll => return,
    };
    sink.emit(event);
}
