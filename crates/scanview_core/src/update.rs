use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::poll::{next_step, PollStep};
use crate::{AppState, Effect, JobHash, Msg, Route};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted { route } => {
            let mut effects = Vec::with_capacity(3);
            if state.release_ticket() {
                effects.push(Effect::CancelPoll);
            }
            let hash = route.job_hash().cloned();
            state.mount(hash.clone());
            effects.push(Effect::FetchDatasets);
            if let Some(hash) = hash {
                effects.push(Effect::FetchJobQuery { hash });
            }
            effects
        }
        Msg::Unmounted => {
            let had_ticket = state.release_ticket();
            state.leave();
            if had_ticket {
                vec![Effect::CancelPoll]
            } else {
                Vec::new()
            }
        }
        Msg::DatasetsLoaded(datasets) => {
            state.set_datasets(datasets);
            Vec::new()
        }
        Msg::JobQueryLoaded { hash, raw_query } => {
            if state.job_hash() != Some(&hash) {
                engine_debug!("Ignoring query text for inactive job {}", hash);
                return (state, Vec::new());
            }
            new_job_hash(&mut state, Some(hash), Some(raw_query))
        }
        Msg::JobQueryFailed { hash, reason } => {
            if state.job_hash() != Some(&hash) {
                return (state, Vec::new());
            }
            // The results are still reachable without the original text.
            engine_warn!("Could not load query text for job {}: {}", hash, reason);
            new_job_hash(&mut state, Some(hash), None)
        }
        Msg::CompileRequested { raw_query, taint } => {
            if state.is_locked() {
                engine_warn!("Compile requested while a job is active; ignored");
                return (state, Vec::new());
            }
            state.set_raw_query(raw_query.clone());
            vec![Effect::CompileQuery { raw_query, taint }]
        }
        Msg::SubmitRequested { raw_query, taint } => {
            if state.is_locked() {
                engine_warn!("Submit requested while a job is active; ignored");
                return (state, Vec::new());
            }
            state.set_raw_query(raw_query.clone());
            vec![Effect::SubmitQuery { raw_query, taint }]
        }
        // Compile results are dropped while a job is active (the editor is locked);
        // only NewJobHash(None) returns to composing.
        Msg::QueryCompiled { plan, raw_query } => {
            if state.is_locked() {
                engine_debug!("Dropping compile result while a job is active");
                return (state, Vec::new());
            }
            state.set_query_plan(plan, raw_query);
            Vec::new()
        }
        Msg::QueryFailed { error, raw_query } => {
            if state.is_locked() {
                engine_debug!("Dropping compile error while a job is active");
                return (state, Vec::new());
            }
            state.set_query_error(error, raw_query);
            Vec::new()
        }
        Msg::QuerySubmitted { hash, raw_query } => {
            new_job_hash(&mut state, Some(hash), Some(raw_query))
        }
        Msg::NewJobHash { hash, raw_query } => new_job_hash(&mut state, hash, raw_query),
        Msg::CollapseToggled => {
            state.toggle_collapsed();
            Vec::new()
        }
        Msg::PollDue { ticket } => {
            if !state.is_current(&ticket) {
                engine_debug!("Ignoring stale poll timer for {}", ticket.hash);
                return (state, Vec::new());
            }
            let offset = state.match_count();
            let limit = state.poll_settings().page_size;
            vec![Effect::FetchMatches {
                ticket,
                offset,
                limit,
            }]
        }
        Msg::MatchesLoaded { ticket, page } => {
            if !state.is_current(&ticket) {
                engine_debug!(
                    "Discarding {} matches from superseded poll of {}",
                    page.matches.len(),
                    ticket.hash
                );
                return (state, Vec::new());
            }
            let page_len = page.matches.len();
            let step = next_step(&page.job.status, page_len, state.poll_settings());
            state.apply_page(page);
            match step {
                PollStep::Continue { delay } => vec![Effect::SchedulePoll { ticket, delay }],
                PollStep::Stop => {
                    engine_info!(
                        "Job {} drained with {} matches",
                        ticket.hash,
                        state.match_count()
                    );
                    state.finish_polling();
                    Vec::new()
                }
            }
        }
        Msg::MatchesFailed { ticket, reason } => {
            if !state.is_current(&ticket) {
                return (state, Vec::new());
            }
            engine_warn!("Polling for job {} stopped: {}", ticket.hash, reason);
            state.stall_polling(reason);
            Vec::new()
        }
        Msg::BackendStatusRequested => vec![Effect::FetchBackendStatus],
        Msg::BackendStatusLoaded(status) => {
            state.set_backend_status(status);
            Vec::new()
        }
        Msg::BackendStatusFailed { reason } => {
            state.set_backend_error(reason);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn new_job_hash(
    state: &mut AppState,
    hash: Option<JobHash>,
    raw_query: Option<String>,
) -> Vec<Effect> {
    if let Some(raw_query) = raw_query {
        state.set_raw_query(raw_query);
    }

    let mut effects = Vec::with_capacity(3);
    let had_ticket = state.release_ticket();

    match hash {
        None => {
            effects.push(Effect::Navigate(Route::Compose));
            if had_ticket {
                effects.push(Effect::CancelPoll);
            }
            state.enter_composing();
        }
        Some(hash) => {
            effects.push(Effect::Navigate(Route::Job(hash.clone())));
            if had_ticket {
                effects.push(Effect::CancelPoll);
            }
            let ticket = state.enter_viewing(hash);
            engine_info!("Polling matches for job {}", ticket.hash);
            effects.push(Effect::FetchMatches {
                ticket,
                offset: 0,
                limit: state.poll_settings().page_size,
            });
        }
    }

    effects
}
