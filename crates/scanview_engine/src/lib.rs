//! Scanview engine: HTTP API client, poll timers and effect execution.
mod client;
mod engine;
mod scheduler;
mod sink;
mod types;

pub use client::{ApiClient, ClientSettings, ReqwestApiClient, DEFAULT_BASE_URL};
pub use engine::{EngineError, EngineHandle};
pub use scheduler::PollScheduler;
pub use sink::{ChannelEventSink, EventSink};
pub use types::{ApiError, CompileOutcome, EngineEvent, FailureKind, SubmitOutcome};
