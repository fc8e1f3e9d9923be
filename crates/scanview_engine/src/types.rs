use std::fmt;

use scanview_core::{
    BackendStatus, DatasetMap, JobHash, MatchPage, PollTicket, QueryError, QueryPlan,
};
use thiserror::Error;

/// Backend answer to a compile request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Plan(QueryPlan),
    Rejected(QueryError),
}

/// Backend answer to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(JobHash),
    Rejected(QueryError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    DatasetsLoaded(Result<DatasetMap, ApiError>),
    JobQueryLoaded {
        hash: JobHash,
        result: Result<String, ApiError>,
    },
    MatchesLoaded {
        ticket: PollTicket,
        result: Result<MatchPage, ApiError>,
    },
    PollDue {
        ticket: PollTicket,
    },
    QueryCompiled {
        raw_query: String,
        result: Result<CompileOutcome, ApiError>,
    },
    QuerySubmitted {
        raw_query: String,
        result: Result<SubmitOutcome, ApiError>,
    },
    BackendStatusLoaded(Result<BackendStatus, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
