use crate::{Batch, Generation, Progress, ValidatedSubmission};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Submit {
        generation: Generation,
        submission: ValidatedSubmission,
    },
    StartPolling { generation: Generation, batch: Batch },
    StopPolling { generation: Generation },
    /// Batch completion event; emitted once per batch.
    NotifyCompleted {
        generation: Generation,
        progress: Progress,
    },
    Deliver { generation: Generation, batch: Batch },
}
