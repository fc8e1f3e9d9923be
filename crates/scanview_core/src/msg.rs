use crate::{
    BackendStatus, DatasetMap, JobHash, MatchPage, PollTicket, QueryError, QueryPlan, Route,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Page opened at `route`; a job route pre-seeds the active hash.
    Mounted { route: Route },
    /// Page left; any pending poll must be released.
    Unmounted,
    /// Dataset descriptors fetched (empty on failure).
    DatasetsLoaded(DatasetMap),
    /// Original query text of the job the page was opened with.
    JobQueryLoaded { hash: JobHash, raw_query: String },
    /// The job query text could not be fetched.
    JobQueryFailed { hash: JobHash, reason: String },
    /// User asked to compile the editor contents.
    CompileRequested {
        raw_query: String,
        taint: Option<String>,
    },
    /// User asked to run the editor contents as a new job.
    SubmitRequested {
        raw_query: String,
        taint: Option<String>,
    },
    /// Backend compiled the query.
    QueryCompiled { plan: QueryPlan, raw_query: String },
    /// Backend rejected the query (or the request failed).
    QueryFailed { error: QueryError, raw_query: String },
    /// Backend accepted a submission and assigned a job hash.
    QuerySubmitted { hash: JobHash, raw_query: String },
    /// Switch to a job hash, or back to composing with `None`.
    NewJobHash {
        hash: Option<JobHash>,
        raw_query: Option<String>,
    },
    /// User toggled the query pane.
    CollapseToggled,
    /// Scheduled delay for the next match page elapsed.
    PollDue { ticket: PollTicket },
    /// A page of matches arrived.
    MatchesLoaded { ticket: PollTicket, page: MatchPage },
    /// A match page request failed.
    MatchesFailed { ticket: PollTicket, reason: String },
    /// User opened the backend status view.
    BackendStatusRequested,
    BackendStatusLoaded(BackendStatus),
    BackendStatusFailed { reason: String },
    /// UI/render tick to coalesce rendering.
    Tick,
}
