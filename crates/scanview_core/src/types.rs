use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque identifier of a submitted query job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHash(String);

impl JobHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobHash {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One result record produced by a job. The payload is never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Match(pub Value);

/// Lifecycle stage reported by the backend for a job.
///
/// The set is open: unknown values are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Queued,
    Processing,
    Done,
    Cancelled,
    Failed,
    Expired,
    Other(String),
}

impl JobStatus {
    /// No further matches are expected once the backlog is drained.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Done | JobStatus::Cancelled | JobStatus::Failed | JobStatus::Expired
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Failed => "failed",
            JobStatus::Expired => "expired",
            JobStatus::Other(other) => other,
        }
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "queued" => JobStatus::Queued,
            "processing" => JobStatus::Processing,
            "done" => JobStatus::Done,
            "cancelled" => JobStatus::Cancelled,
            "failed" => JobStatus::Failed,
            "expired" => JobStatus::Expired,
            _ => JobStatus::Other(value),
        }
    }
}

impl From<JobStatus> for String {
    fn from(value: JobStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest job record returned alongside a page of matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_done: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_estimated: Option<u64>,
    /// Any other progress fields, kept for display.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobRecord {
    pub fn with_status(status: JobStatus) -> Self {
        Self {
            status,
            work_done: None,
            work_estimated: None,
            extra: Map::new(),
        }
    }
}

/// Response of `GET /matches/{hash}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPage {
    #[serde(default)]
    pub matches: Vec<Match>,
    pub job: JobRecord,
}

/// Successful compilation result for a raw query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryPlan(pub Value);

/// Compilation (or submission) failure shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub taints: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dataset {
    pub fn with_taints<I, S>(taints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taints: taints.into_iter().map(Into::into).collect(),
            extra: Map::new(),
        }
    }
}

pub type DatasetMap = BTreeMap<String, Dataset>;

/// Progress record of a worker job on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendJobRecord {
    pub id: String,
    #[serde(default)]
    pub connection_id: String,
    #[serde(default)]
    pub request: String,
    #[serde(default)]
    pub work_done: u64,
    #[serde(default)]
    pub work_estimated: u64,
}

/// Response of `GET /backend`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackendStatus {
    #[serde(default)]
    pub db_alive: bool,
    #[serde(default)]
    pub jobs: Vec<BackendJobRecord>,
}
