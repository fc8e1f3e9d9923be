use crate::BackendJobRecord;

/// One table row of the backend job status view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendJobRow {
    pub id: String,
    pub connection: String,
    pub request: String,
    pub progress: String,
}

pub fn backend_job_rows(jobs: &[BackendJobRecord]) -> Vec<BackendJobRow> {
    jobs.iter()
        .map(|job| BackendJobRow {
            id: job.id.clone(),
            connection: job.connection_id.clone(),
            request: job.request.clone(),
            progress: format!("{} / {}", job.work_done, job.work_estimated),
        })
        .collect()
}
