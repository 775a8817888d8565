use bytes::Bytes;
use mediaconv_core::{Batch, DeliverySummary, Generation, JobId, JobRowView, JobState, Progress};

use crate::api::{ApiError, SubmitError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Submitted {
        generation: Generation,
        result: Result<Batch, SubmitError>,
    },
    RoundObserved {
        generation: Generation,
        progress: Progress,
        jobs: Vec<JobRowView>,
    },
    /// Emitted once per batch by its poller.
    BatchCompleted {
        generation: Generation,
        batch: Batch,
    },
    Delivered {
        generation: Generation,
        result: Result<Delivery, BundleError>,
    },
    /// Answer to a one-off status query.
    StatusReported {
        job_id: JobId,
        result: Result<JobState, ApiError>,
    },
}

/// The result of delivering a completed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Archive(Archive),
    File(DeliveredFile),
    /// The single job of a direct batch produced nothing to download.
    Unavailable {
        job_id: JobId,
        display_name: String,
        reason: String,
    },
}

impl Delivery {
    pub fn summary(&self) -> DeliverySummary {
        match self {
            Delivery::Archive(archive) => DeliverySummary {
                file_name: Some(archive.file_name.clone()),
                entries: archive.entries.len(),
                skipped: archive.skipped.len(),
            },
            Delivery::File(file) => DeliverySummary {
                file_name: Some(file.file_name.clone()),
                entries: 1,
                skipped: 0,
            },
            Delivery::Unavailable { .. } => DeliverySummary {
                file_name: None,
                entries: 0,
                skipped: 1,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub file_name: String,
    pub bytes: Bytes,
    /// Entries in submission order.
    pub entries: Vec<ArchiveEntry>,
    pub skipped: Vec<SkippedJob>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub job_id: JobId,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredFile {
    pub job_id: JobId,
    pub file_name: String,
    pub bytes: Bytes,
}

/// A job left out of the delivery, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedJob {
    pub job_id: JobId,
    pub display_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BundleError {
    #[error("archive error: {0}")]
    Zip(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<zip::result::ZipError> for BundleError {
    fn from(err: zip::result::ZipError) -> Self {
        BundleError::Zip(err.to_string())
    }
}

impl From<std::io::Error> for BundleError {
    fn from(err: std::io::Error) -> Self {
        BundleError::Io(err.to_string())
    }
}
