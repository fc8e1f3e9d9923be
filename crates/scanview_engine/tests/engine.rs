use std::collections::VecDeque;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use scanview_core::{
    BackendStatus, DatasetMap, JobHash, JobRecord, JobStatus, Match, MatchPage, PollTicket,
    QueryPlan,
};
use scanview_engine::{
    ApiClient, ApiError, CompileOutcome, EngineEvent, EngineHandle, SubmitOutcome,
};
use serde_json::json;

const WAIT: Duration = Duration::from_secs(5);

/// Serves scripted match pages and records requested windows.
#[derive(Default)]
struct ScriptedClient {
    pages: Mutex<VecDeque<MatchPage>>,
    requests: Mutex<Vec<(String, usize, usize)>>,
}

impl ScriptedClient {
    fn with_pages(pages: Vec<MatchPage>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ApiClient for ScriptedClient {
    async fn job_query(&self, hash: &JobHash) -> Result<String, ApiError> {
        Ok(format!("rule {hash} {{ condition: true }}"))
    }

    async fn datasets(&self) -> Result<DatasetMap, ApiError> {
        Ok(DatasetMap::new())
    }

    async fn matches(
        &self,
        hash: &JobHash,
        offset: usize,
        limit: usize,
    ) -> Result<MatchPage, ApiError> {
        self.requests
            .lock()
            .unwrap()
            .push((hash.to_string(), offset, limit));
        Ok(self.pages.lock().unwrap().pop_front().unwrap_or(MatchPage {
            matches: Vec::new(),
            job: JobRecord::with_status(JobStatus::Done),
        }))
    }

    async fn backend_status(&self) -> Result<BackendStatus, ApiError> {
        Ok(BackendStatus::default())
    }

    async fn compile(
        &self,
        raw_query: &str,
        _taint: Option<&str>,
    ) -> Result<CompileOutcome, ApiError> {
        Ok(CompileOutcome::Plan(QueryPlan(json!({ "raw": raw_query }))))
    }

    async fn submit(
        &self,
        _raw_query: &str,
        _taint: Option<&str>,
    ) -> Result<SubmitOutcome, ApiError> {
        Ok(SubmitOutcome::Accepted(JobHash::new("abc123")))
    }
}

fn ticket(hash: &str, epoch: u64) -> PollTicket {
    PollTicket {
        hash: JobHash::new(hash),
        epoch,
    }
}

fn engine(client: Arc<ScriptedClient>) -> (EngineHandle, mpsc::Receiver<EngineEvent>) {
    let (event_tx, event_rx) = mpsc::channel();
    let handle = EngineHandle::with_client(client, event_tx).expect("engine");
    (handle, event_rx)
}

#[test]
fn fetch_matches_reports_page_with_ticket() {
    let page = MatchPage {
        matches: vec![Match(json!({"file": "a"}))],
        job: JobRecord::with_status(JobStatus::Processing),
    };
    let client = Arc::new(ScriptedClient::with_pages(vec![page.clone()]));
    let (engine, events) = engine(client.clone());

    engine.fetch_matches(ticket("abc123", 1), 0, 50);

    let event = events.recv_timeout(WAIT).expect("event");
    assert_eq!(
        event,
        EngineEvent::MatchesLoaded {
            ticket: ticket("abc123", 1),
            result: Ok(page),
        }
    );
    assert_eq!(
        client.requests.lock().unwrap().as_slice(),
        &[("abc123".to_string(), 0, 50)]
    );
}

#[test]
fn scheduled_poll_fires_once_after_delay() {
    let (engine, events) = engine(Arc::new(ScriptedClient::default()));

    engine.schedule_poll(ticket("abc123", 1), Duration::from_millis(20));

    let event = events.recv_timeout(WAIT).expect("event");
    assert_eq!(
        event,
        EngineEvent::PollDue {
            ticket: ticket("abc123", 1)
        }
    );
    assert!(events.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn cancelled_poll_never_fires() {
    let (engine, events) = engine(Arc::new(ScriptedClient::default()));

    engine.schedule_poll(ticket("abc123", 1), Duration::from_millis(50));
    engine.cancel_poll();

    assert!(events.recv_timeout(Duration::from_millis(250)).is_err());
}

#[test]
fn rescheduling_replaces_pending_timer() {
    let (engine, events) = engine(Arc::new(ScriptedClient::default()));

    engine.schedule_poll(ticket("abc123", 1), Duration::from_millis(100));
    engine.schedule_poll(ticket("xyz789", 2), Duration::from_millis(10));

    let event = events.recv_timeout(WAIT).expect("event");
    assert_eq!(
        event,
        EngineEvent::PollDue {
            ticket: ticket("xyz789", 2)
        }
    );
    assert!(events.recv_timeout(Duration::from_millis(250)).is_err());
}

#[test]
fn job_query_and_submit_round_trip_through_events() {
    let (engine, events) = engine(Arc::new(ScriptedClient::default()));

    engine.fetch_job_query(JobHash::new("abc123"));
    let event = events.recv_timeout(WAIT).expect("event");
    assert_eq!(
        event,
        EngineEvent::JobQueryLoaded {
            hash: JobHash::new("abc123"),
            result: Ok("rule abc123 { condition: true }".to_string()),
        }
    );

    engine.submit("rule a".to_string(), None);
    let event = events.recv_timeout(WAIT).expect("event");
    assert_eq!(
        event,
        EngineEvent::QuerySubmitted {
            raw_query: "rule a".to_string(),
            result: Ok(SubmitOutcome::Accepted(JobHash::new("abc123"))),
        }
    );
}
