use crate::poll::PollSettings;
use crate::taints::available_taints;
use crate::view_model::AppViewModel;
use crate::{
    backend_job_rows, BackendStatus, DatasetMap, JobHash, JobRecord, Match, MatchPage,
    QueryError, QueryPlan,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Composing,
    Viewing,
}

/// Identifies one polling loop. Results carrying a ticket other than the
/// current one belong to a superseded loop and are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PollTicket {
    pub hash: JobHash,
    pub epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PollStatus {
    #[default]
    Idle,
    Polling,
    Finished,
    /// A request failed and the loop stopped without retrying.
    Stalled { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    mode: Mode,
    collapsed: bool,
    job_hash: Option<JobHash>,
    raw_query: String,
    query_plan: Option<QueryPlan>,
    query_error: Option<QueryError>,
    matches: Vec<Match>,
    job: Option<JobRecord>,
    datasets: DatasetMap,
    datasets_loaded: bool,
    backend: Option<BackendStatus>,
    backend_error: Option<String>,
    ticket: Option<PollTicket>,
    last_epoch: u64,
    poll: PollStatus,
    poll_settings: PollSettings,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page size of zero is raised to one; an empty request can never drain a job.
    pub fn with_poll_settings(mut poll_settings: PollSettings) -> Self {
        poll_settings.page_size = poll_settings.page_size.max(1);
        Self {
            poll_settings,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            mode: self.mode,
            collapsed: self.collapsed,
            job_hash: self.job_hash.clone(),
            raw_query: self.raw_query.clone(),
            is_loading: self.job_hash.is_some() && self.raw_query.is_empty(),
            is_locked: self.is_locked(),
            query_plan: self.query_plan.clone(),
            query_error: self.query_error.as_ref().map(|err| err.message.clone()),
            match_count: self.matches.len(),
            matches: self.matches.clone(),
            job: self.job.clone(),
            available_taints: available_taints(&self.datasets).into_iter().collect(),
            datasets_loaded: self.datasets_loaded,
            db_alive: self.backend.as_ref().map(|status| status.db_alive),
            backend_rows: self
                .backend
                .as_ref()
                .map(|status| backend_job_rows(&status.jobs))
                .unwrap_or_default(),
            backend_error: self.backend_error.clone(),
            poll: self.poll.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn poll_settings(&self) -> &PollSettings {
        &self.poll_settings
    }

    pub fn current_ticket(&self) -> Option<&PollTicket> {
        self.ticket.as_ref()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn job_hash(&self) -> Option<&JobHash> {
        self.job_hash.as_ref()
    }

    /// The query editor is read-only while a job is active.
    pub(crate) fn is_locked(&self) -> bool {
        self.job_hash.is_some()
    }

    pub(crate) fn is_current(&self, ticket: &PollTicket) -> bool {
        self.ticket.as_ref() == Some(ticket)
    }

    pub(crate) fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub(crate) fn set_raw_query(&mut self, raw_query: String) {
        self.raw_query = raw_query;
        self.mark_dirty();
    }

    /// Resets everything but the poll settings, pre-seeding `job_hash`.
    pub(crate) fn mount(&mut self, job_hash: Option<JobHash>) {
        let poll_settings = std::mem::take(&mut self.poll_settings);
        let last_epoch = self.last_epoch;
        *self = Self {
            mode: if job_hash.is_some() {
                Mode::Viewing
            } else {
                Mode::Composing
            },
            job_hash,
            poll_settings,
            last_epoch,
            ..Self::default()
        };
        self.mark_dirty();
    }

    pub(crate) fn set_query_plan(&mut self, plan: QueryPlan, raw_query: String) {
        self.mode = Mode::Composing;
        self.query_plan = Some(plan);
        self.query_error = None;
        self.raw_query = raw_query;
        self.clear_results();
        self.mark_dirty();
    }

    pub(crate) fn set_query_error(&mut self, error: QueryError, raw_query: String) {
        self.mode = Mode::Composing;
        self.query_error = Some(error);
        self.query_plan = None;
        self.raw_query = raw_query;
        self.clear_results();
        self.mark_dirty();
    }

    pub(crate) fn enter_composing(&mut self) {
        self.mode = Mode::Composing;
        self.job_hash = None;
        self.poll = PollStatus::Idle;
        self.clear_results();
        self.mark_dirty();
    }

    /// Switches to `hash` and opens a fresh polling loop for it.
    pub(crate) fn enter_viewing(&mut self, hash: JobHash) -> PollTicket {
        self.mode = Mode::Viewing;
        self.collapsed = true;
        self.query_plan = None;
        self.query_error = None;
        self.clear_results();
        self.last_epoch += 1;
        let ticket = PollTicket {
            hash: hash.clone(),
            epoch: self.last_epoch,
        };
        self.job_hash = Some(hash);
        self.ticket = Some(ticket.clone());
        self.poll = PollStatus::Polling;
        self.mark_dirty();
        ticket
    }

    /// Drops the active polling loop; returns whether there was one.
    pub(crate) fn release_ticket(&mut self) -> bool {
        self.ticket.take().is_some()
    }

    pub(crate) fn leave(&mut self) {
        self.job_hash = None;
        self.mode = Mode::Composing;
        if self.poll == PollStatus::Polling {
            self.poll = PollStatus::Idle;
        }
        self.mark_dirty();
    }

    pub(crate) fn apply_page(&mut self, page: MatchPage) {
        self.matches.extend(page.matches);
        self.job = Some(page.job);
        self.mark_dirty();
    }

    pub(crate) fn finish_polling(&mut self) {
        self.ticket = None;
        self.poll = PollStatus::Finished;
        self.mark_dirty();
    }

    pub(crate) fn stall_polling(&mut self, reason: String) {
        self.ticket = None;
        self.poll = PollStatus::Stalled { reason };
        self.mark_dirty();
    }

    pub(crate) fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
        self.mark_dirty();
    }

    pub(crate) fn set_datasets(&mut self, datasets: DatasetMap) {
        self.datasets = datasets;
        self.datasets_loaded = true;
        self.mark_dirty();
    }

    pub(crate) fn set_backend_status(&mut self, status: BackendStatus) {
        self.backend = Some(status);
        self.backend_error = None;
        self.mark_dirty();
    }

    pub(crate) fn set_backend_error(&mut self, reason: String) {
        self.backend_error = Some(reason);
        self.mark_dirty();
    }

    fn clear_results(&mut self) {
        self.matches.clear();
        self.job = None;
    }
}
