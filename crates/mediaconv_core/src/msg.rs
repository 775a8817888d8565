use crate::{Batch, DeliverySummary, Generation, JobRowView, Progress, SubmissionRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked to submit files or a URL.
    SubmitRequested(SubmissionRequest),
    /// Backend created the jobs.
    SubmissionSucceeded { generation: Generation, batch: Batch },
    /// Transport failure or non-success answer to the submission.
    SubmissionFailed { generation: Generation, message: String },
    /// A polling round was applied to the batch.
    RoundObserved {
        generation: Generation,
        progress: Progress,
        jobs: Vec<JobRowView>,
    },
    /// Every job reached a terminal state; the poller hands the batch back.
    BatchCompleted { generation: Generation, batch: Batch },
    /// User clicked the download/bundle action.
    DeliverRequested,
    DeliveryFinished {
        generation: Generation,
        summary: DeliverySummary,
    },
    DeliveryFailed { generation: Generation, message: String },
    /// User reset the form or left the view.
    ResetRequested,
    /// UI/render tick to coalesce rendering.
    Tick,
    NoOp,
}
