use std::time::Duration;

use crate::{JobHash, PollTicket, Route};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Navigate(Route),
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
    CompileQuery {
        raw_query: String,
        taint: Option<String>,
    },
    SubmitQuery {
        raw_query: String,
        taint: Option<String>,
    },
    FetchBackendStatus,
}
