use std::io::{Cursor, Write};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::join_all;
use mediaconv_core::{
    name_from_location, output_file_name, Batch, DeliveryMode, EntryNamer, Job, JobState,
    OutputTarget, ResultLocation,
};
use mediaconv_logging::{batch_info, batch_warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::api::JobApi;
use crate::types::{Archive, ArchiveEntry, BundleError, DeliveredFile, Delivery, SkippedJob};

pub const DEFAULT_ARCHIVE_NAME: &str = "converted_folder.zip";

/// Name used for a server-named output when the location has no usable segment.
const FALLBACK_DOWNLOAD_NAME: &str = "download";

/// Collects the outputs of a completed batch.
///
/// Every job is re-queried once before its artifact is fetched; the cached
/// state of the batch is only used for naming and ordering.
#[derive(Clone)]
pub struct ResultBundler {
    api: Arc<dyn JobApi>,
    archive_name: String,
}

impl ResultBundler {
    pub fn new(api: Arc<dyn JobApi>) -> Self {
        Self {
            api,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }

    pub fn with_archive_name(mut self, archive_name: impl Into<String>) -> Self {
        self.archive_name = archive_name.into();
        self
    }

    /// Archives folder batches and hands single-job batches over directly.
    pub async fn deliver(&self, batch: &Batch) -> Result<Delivery, BundleError> {
        match (batch.delivery(), batch.jobs().first()) {
            (DeliveryMode::Direct, Some(job)) => Ok(self.fetch_direct(batch, job).await),
            _ => self.bundle(batch).await.map(Delivery::Archive),
        }
    }

    /// Builds the zip archive of every job that reconciles to success.
    ///
    /// Jobs that failed or whose artifact cannot be retrieved are left out
    /// and listed in [`Archive::skipped`]. A batch without a single success
    /// yields an empty archive.
    pub async fn bundle(&self, batch: &Batch) -> Result<Archive, BundleError> {
        let retrievals = join_all(batch.jobs().iter().map(|job| self.retrieve(job))).await;

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut namer = EntryNamer::new();
        let mut entries = Vec::new();
        let mut skipped = Vec::new();

        for (job, retrieval) in batch.jobs().iter().zip(retrievals) {
            match retrieval {
                Ok((location, bytes)) => {
                    let name = namer.claim(&entry_name(batch.output(), job, &location));
                    writer.start_file(name.as_str(), options)?;
                    writer.write_all(&bytes)?;
                    entries.push(ArchiveEntry {
                        job_id: job.id().clone(),
                        name,
                        size: bytes.len() as u64,
                    });
                }
                Err(reason) => skipped.push(skip(job, reason)),
            }
        }

        let bytes = writer.finish()?.into_inner();
        batch_info!(
            "archive {} built: {} entries, {} skipped, {} bytes",
            self.archive_name,
            entries.len(),
            skipped.len(),
            bytes.len()
        );
        Ok(Archive {
            file_name: self.archive_name.clone(),
            bytes: Bytes::from(bytes),
            entries,
            skipped,
        })
    }

    async fn fetch_direct(&self, batch: &Batch, job: &Job) -> Delivery {
        match self.retrieve(job).await {
            Ok((location, bytes)) => {
                let file_name = entry_name(batch.output(), job, &location);
                batch_info!("{} ready ({} bytes)", file_name, bytes.len());
                Delivery::File(DeliveredFile {
                    job_id: job.id().clone(),
                    file_name,
                    bytes,
                })
            }
            Err(reason) => {
                let SkippedJob {
                    job_id,
                    display_name,
                    reason,
                } = skip(job, reason);
                Delivery::Unavailable {
                    job_id,
                    display_name,
                    reason,
                }
            }
        }
    }

    /// Reconciliation read followed by the artifact download.
    async fn retrieve(&self, job: &Job) -> Result<(ResultLocation, Bytes), String> {
        let state = self
            .api
            .status(job.id())
            .await
            .map_err(|err| format!("status unavailable: {err}"))?;
        match state {
            JobState::Success { location } => {
                let bytes = self
                    .api
                    .fetch_artifact(&location)
                    .await
                    .map_err(|err| format!("download failed: {err}"))?;
                Ok((location, bytes))
            }
            JobState::Failure { info } => Err(format!("job failed: {info}")),
            other => Err(format!("job not finished ({})", other.label())),
        }
    }
}

fn entry_name(output: &OutputTarget, job: &Job, location: &ResultLocation) -> String {
    match output {
        OutputTarget::Format(target) => output_file_name(job.display_name(), target),
        OutputTarget::ServerNamed => name_from_location(location, FALLBACK_DOWNLOAD_NAME),
    }
}

fn skip(job: &Job, reason: String) -> SkippedJob {
    batch_warn!("skipping {} ({}): {}", job.display_name(), job.id(), reason);
    SkippedJob {
        job_id: job.id().clone(),
        display_name: job.display_name().to_string(),
        reason,
    }
}
