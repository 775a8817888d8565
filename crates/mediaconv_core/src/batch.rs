use std::collections::HashMap;

use crate::{Job, JobId, JobState, Observation, SubmittedTask, TargetFormat, ValidatedSubmission};

/// How the output file of each job is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Every job converts to this format; outputs are named after the input.
    Format(TargetFormat),
    /// The backend chooses the output name (remote fetches).
    ServerNamed,
}

/// How results reach the user once the batch completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// All successful outputs bundled into one archive.
    Archive,
    /// The single job's output handed over as-is.
    Direct,
}

/// What to do with a job whose status query keeps failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransientErrorPolicy {
    /// Keep the job pending and query it again every round.
    #[default]
    RetryForever,
    /// Record the job as failed after this many consecutive failed rounds.
    GiveUpAfter(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.done == self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    pub progress: Progress,
    /// True only on the round that completed the batch.
    pub completed: bool,
}

/// The jobs created by one submission.
///
/// Jobs are never added or removed after construction; only their states
/// change, and a terminal state is never replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    jobs: Vec<Job>,
    output: OutputTarget,
    delivery: DeliveryMode,
    completion_fired: bool,
}

impl Batch {
    pub fn new(jobs: Vec<Job>, output: OutputTarget, delivery: DeliveryMode) -> Self {
        Self {
            jobs,
            output,
            delivery,
            completion_fired: false,
        }
    }

    /// Builds the batch from the backend's answer, keeping submission order.
    pub fn from_tasks(submission: &ValidatedSubmission, tasks: Vec<SubmittedTask>) -> Self {
        let jobs = tasks
            .into_iter()
            .map(|task| Job::new(task.id, task.name))
            .collect();
        let (output, delivery) = match submission {
            ValidatedSubmission::Folder { target, .. } => {
                (OutputTarget::Format(target.clone()), DeliveryMode::Archive)
            }
            ValidatedSubmission::SingleFile { target, .. } => {
                (OutputTarget::Format(target.clone()), DeliveryMode::Direct)
            }
            ValidatedSubmission::RemoteFetch { .. } => {
                (OutputTarget::ServerNamed, DeliveryMode::Direct)
            }
        };
        Self::new(jobs, output, delivery)
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }

    pub fn delivery(&self) -> DeliveryMode {
        self.delivery
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn done_count(&self) -> usize {
        self.jobs.iter().filter(|job| job.is_terminal()).count()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            done: self.done_count(),
            total: self.jobs.len(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress().is_complete()
    }

    /// Ids of the jobs the next polling round must query.
    pub fn pending_ids(&self) -> Vec<JobId> {
        self.jobs
            .iter()
            .filter(|job| !job.is_terminal())
            .map(|job| job.id().clone())
            .collect()
    }

    pub fn job(&self, id: &JobId) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id() == id)
    }

    /// Merges one polling round into the batch.
    ///
    /// Observations for terminal jobs and unknown ids are ignored. An
    /// unreachable job keeps its previous state unless `policy` gives up on it.
    pub fn apply_round(
        &mut self,
        observations: Vec<(JobId, Observation)>,
        policy: TransientErrorPolicy,
    ) -> RoundOutcome {
        let mut by_id: HashMap<JobId, Observation> = observations.into_iter().collect();

        for job in self.jobs.iter_mut().filter(|job| !job.is_terminal()) {
            let Some(observation) = by_id.remove(job.id()) else {
                continue;
            };
            match observation {
                Observation::Reported(state) => job.record_state(state),
                Observation::Unreachable { reason } => {
                    let streak = job.record_unreachable();
                    if let TransientErrorPolicy::GiveUpAfter(limit) = policy {
                        if streak >= limit.max(1) {
                            job.record_state(JobState::Failure {
                                info: format!(
                                    "status unavailable after {streak} attempts: {reason}"
                                ),
                            });
                        }
                    }
                }
            }
        }

        let progress = self.progress();
        let completed = progress.is_complete() && !self.completion_fired;
        if completed {
            self.completion_fired = true;
        }
        RoundOutcome {
            progress,
            completed,
        }
    }
}
