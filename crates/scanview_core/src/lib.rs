//! Scanview core: pure state machine and view-model helpers.
mod backend_status;
mod effect;
mod msg;
pub mod poll;
mod route;
mod state;
mod taints;
mod types;
mod update;
mod view_model;

pub use backend_status::{backend_job_rows, BackendJobRow};
pub use effect::Effect;
pub use msg::Msg;
pub use poll::{next_step, PollSettings, PollStep};
pub use route::Route;
pub use state::{AppState, Mode, PollStatus, PollTicket};
pub use taints::available_taints;
pub use types::{
    BackendJobRecord, BackendStatus, Dataset, DatasetMap, JobHash, JobRecord, JobStatus, Match,
    MatchPage, QueryError, QueryPlan,
};
pub use update::update;
pub use view_model::AppViewModel;
