use std::fmt;

use bytes::Bytes;
use mediaconv_core::{JobId, JobState, ResultLocation, SubmittedTask, ValidatedSubmission};

/// Message shown when the backend rejects a submission without explaining why.
pub(crate) const GENERIC_SUBMIT_FAILURE: &str = "submission failed";

/// The three backend operations the orchestrator relies on.
#[async_trait::async_trait]
pub trait JobApi: Send + Sync {
    /// Creates one job per input (or one for a URL) and returns them in
    /// submission order. All-or-nothing.
    async fn submit(
        &self,
        submission: &ValidatedSubmission,
    ) -> Result<Vec<SubmittedTask>, SubmitError>;

    /// Current state of a job. Idempotent.
    async fn status(&self, job_id: &JobId) -> Result<JobState, ApiError>;

    /// Raw bytes of a finished job's output. Idempotent.
    async fn fetch_artifact(&self, location: &ResultLocation) -> Result<Bytes, ApiError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ApiFailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Malformed,
}

impl fmt::Display for ApiFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailureKind::InvalidUrl => write!(f, "invalid url"),
            ApiFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            ApiFailureKind::Timeout => write!(f, "timeout"),
            ApiFailureKind::Network => write!(f, "network error"),
            ApiFailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            ApiFailureKind::Malformed => write!(f, "malformed response"),
        }
    }
}

/// Why a submission did not create a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("failed to read {path}: {message}")]
    ReadInput { path: String, message: String },
    #[error("submission request failed: {0}")]
    Transport(ApiError),
    #[error("submission rejected with status {status}")]
    Rejected { status: u16, detail: Option<String> },
    #[error("unexpected submission response: {0}")]
    Malformed(String),
}

impl SubmitError {
    /// Text for the user: the server's own explanation when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            SubmitError::Rejected { detail: None, .. } | SubmitError::Malformed(_) => {
                GENERIC_SUBMIT_FAILURE.to_string()
            }
            SubmitError::ReadInput { .. } | SubmitError::Transport(_) => {
                format!("{GENERIC_SUBMIT_FAILURE}: {self}")
            }
        }
    }
}
