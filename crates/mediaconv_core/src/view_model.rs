use crate::{Job, JobId, JobState, Phase, Progress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub name: String,
    pub status: JobStatus,
    /// Backend diagnostic for failed jobs.
    pub detail: Option<String>,
}

impl JobRowView {
    pub fn from_job(job: &Job) -> Self {
        let (status, detail) = match job.state() {
            JobState::Pending => (JobStatus::Pending, None),
            JobState::Running => (JobStatus::Running, None),
            JobState::Success { .. } => (JobStatus::Succeeded, None),
            JobState::Failure { info } => (JobStatus::Failed, Some(info.clone())),
        };
        Self {
            job_id: job.id().clone(),
            name: job.display_name().to_string(),
            status,
            detail,
        }
    }
}

/// What a finished delivery produced, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverySummary {
    /// Suggested file name of the delivered artifact or archive.
    pub file_name: Option<String>,
    pub entries: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionViewModel {
    pub phase: Phase,
    pub generation: u64,
    pub progress: Option<Progress>,
    pub jobs: Vec<JobRowView>,
    pub last_error: Option<String>,
    /// Whether the deliver action is currently available.
    pub can_deliver: bool,
    pub delivery: Option<DeliverySummary>,
    pub dirty: bool,
}
