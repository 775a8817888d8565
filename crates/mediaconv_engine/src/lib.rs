//! Mediaconv engine: backend client, polling, bundling and effect execution.
mod api;
mod bundle;
mod engine;
mod http;
mod persist;
mod poller;
mod report;
mod types;
mod wire;

pub use api::{ApiError, ApiFailureKind, JobApi, SubmitError};
pub use bundle::{ResultBundler, DEFAULT_ARCHIVE_NAME};
pub use engine::{EngineConfig, EngineError, EngineHandle};
pub use http::{ApiSettings, HttpJobApi};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poller::{
    poll_round, ChannelProgressSink, PollOutcome, PollSettings, ProgressSink, StatusPoller,
};
pub use report::{build_batch_report, write_batch_report, ReportError, REPORT_FILENAME};
pub use types::{
    Archive, ArchiveEntry, BundleError, DeliveredFile, Delivery, EngineEvent, SkippedJob,
};
