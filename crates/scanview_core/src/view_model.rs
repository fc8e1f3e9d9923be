use crate::{BackendJobRow, JobHash, JobRecord, Match, Mode, PollStatus, QueryPlan};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub mode: Mode,
    pub collapsed: bool,
    pub job_hash: Option<JobHash>,
    pub raw_query: String,
    /// A job is open but its query text has not arrived yet.
    pub is_loading: bool,
    pub is_locked: bool,
    pub query_plan: Option<QueryPlan>,
    pub query_error: Option<String>,
    pub match_count: usize,
    pub matches: Vec<Match>,
    pub job: Option<JobRecord>,
    pub available_taints: Vec<String>,
    pub datasets_loaded: bool,
    pub db_alive: Option<bool>,
    pub backend_rows: Vec<BackendJobRow>,
    pub backend_error: Option<String>,
    pub poll: PollStatus,
    pub dirty: bool,
}
