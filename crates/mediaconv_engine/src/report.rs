use std::path::{Path, PathBuf};

use mediaconv_core::{Batch, Job, JobState};
use serde_json::{json, Value};

use crate::persist::{AtomicFileWriter, PersistError};
use crate::types::{Delivery, SkippedJob};

pub const REPORT_FILENAME: &str = "mediaconv-report.json";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Manifest of a finished batch: per-job outcome plus what was delivered.
pub fn build_batch_report(batch: &Batch, delivery: Option<&Delivery>, generated_utc: &str) -> Value {
    let succeeded = batch
        .jobs()
        .iter()
        .filter(|job| matches!(job.state(), JobState::Success { .. }))
        .count();
    let failed = batch
        .jobs()
        .iter()
        .filter(|job| matches!(job.state(), JobState::Failure { .. }))
        .count();

    json!({
        "generated_utc": generated_utc,
        "total": batch.len(),
        "succeeded": succeeded,
        "failed": failed,
        "jobs": batch.jobs().iter().map(job_entry).collect::<Vec<_>>(),
        "delivery": delivery.map(delivery_entry),
    })
}

pub fn write_batch_report(dir: &Path, report: &Value) -> Result<PathBuf, ReportError> {
    let content = serde_json::to_vec_pretty(report)?;
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    Ok(writer.write(REPORT_FILENAME, &content)?)
}

fn job_entry(job: &Job) -> Value {
    let (location, info) = match job.state() {
        JobState::Success { location } => (Some(location.as_str()), None),
        JobState::Failure { info } => (None, Some(info.as_str())),
        JobState::Pending | JobState::Running => (None, None),
    };
    json!({
        "task_id": job.id().as_str(),
        "name": job.display_name(),
        "state": job.state().label(),
        "download_url": location,
        "info": info,
    })
}

fn delivery_entry(delivery: &Delivery) -> Value {
    match delivery {
        Delivery::Archive(archive) => json!({
            "kind": "archive",
            "file_name": archive.file_name,
            "bytes": archive.bytes.len(),
            "entries": archive.entries.iter().map(|entry| json!({
                "task_id": entry.job_id.as_str(),
                "name": entry.name,
                "size": entry.size,
            })).collect::<Vec<_>>(),
            "skipped": archive.skipped.iter().map(skipped_entry).collect::<Vec<_>>(),
        }),
        Delivery::File(file) => json!({
            "kind": "file",
            "file_name": file.file_name,
            "bytes": file.bytes.len(),
            "task_id": file.job_id.as_str(),
        }),
        Delivery::Unavailable {
            job_id,
            display_name,
            reason,
        } => json!({
            "kind": "unavailable",
            "task_id": job_id.as_str(),
            "name": display_name,
            "reason": reason,
        }),
    }
}

fn skipped_entry(skipped: &SkippedJob) -> Value {
    json!({
        "task_id": skipped.job_id.as_str(),
        "name": skipped.display_name,
        "reason": skipped.reason,
    })
}
