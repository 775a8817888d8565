//! Mediaconv core: batch domain model, aggregation rules and the pure
//! session state machine.
mod batch;
mod catalog;
mod effect;
mod job;
mod msg;
mod naming;
mod state;
mod submission;
mod update;
mod view_model;

pub use batch::{Batch, DeliveryMode, OutputTarget, Progress, RoundOutcome, TransientErrorPolicy};
pub use catalog::{extension_of, FetchKind, MediaKind, TargetFormat};
pub use effect::Effect;
pub use job::{Job, JobId, JobState, Observation, ResultLocation};
pub use msg::Msg;
pub use naming::{name_from_location, output_file_name, sanitize_file_name, EntryNamer};
pub use state::{Generation, Phase, SessionState};
pub use submission::{
    InputFile, PreconditionError, SubmissionRequest, SubmittedTask, ValidatedSubmission,
};
pub use update::update;
pub use view_model::{DeliverySummary, JobRowView, JobStatus, SessionViewModel};
