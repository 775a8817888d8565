use std::path::{Path, PathBuf};

use chrono::Utc;
use mediaconv_core::Batch;
use mediaconv_engine::{
    build_batch_report, write_batch_report, AtomicFileWriter, Delivery, PersistError, ReportError,
};
use mediaconv_logging::batch_info;

/// Writes the delivered archive or file into `dir`.
///
/// Returns `None` when the delivery carried nothing to save.
pub fn save_delivery(dir: &Path, delivery: &Delivery) -> Result<Option<PathBuf>, PersistError> {
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let path = match delivery {
        Delivery::Archive(archive) => writer.write(&archive.file_name, &archive.bytes)?,
        Delivery::File(file) => writer.write(&file.file_name, &file.bytes)?,
        Delivery::Unavailable { .. } => return Ok(None),
    };
    batch_info!("saved {}", path.display());
    Ok(Some(path))
}

pub fn save_report(
    dir: &Path,
    batch: &Batch,
    delivery: Option<&Delivery>,
) -> Result<PathBuf, ReportError> {
    let generated_utc = Utc::now().to_rfc3339();
    let report = build_batch_report(batch, delivery, &generated_utc);
    write_batch_report(dir, &report)
}
