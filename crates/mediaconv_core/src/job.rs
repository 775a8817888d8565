use std::fmt;

/// Opaque identifier issued by the backend when a job is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a finished job's output can be retrieved from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultLocation(String);

impl ResultLocation {
    /// Returns `None` for an empty or blank location.
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        if location.trim().is_empty() {
            None
        } else {
            Some(Self(location))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-reported lifecycle of a job.
///
/// The result location only exists on success and the diagnostic only on
/// failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Success { location: ResultLocation },
    Failure { info: String },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Success { .. } | JobState::Failure { .. })
    }

    pub fn location(&self) -> Option<&ResultLocation> {
        match self {
            JobState::Success { location } => Some(location),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Success { .. } => "SUCCESS",
            JobState::Failure { .. } => "FAILURE",
        }
    }
}

/// Outcome of one status query inside a polling round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The backend answered with a state.
    Reported(JobState),
    /// The query failed (transport, HTTP status, undecodable body).
    Unreachable { reason: String },
}

/// One server-side unit of work tracked by a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: JobId,
    display_name: String,
    state: JobState,
    unreachable_streak: u32,
}

impl Job {
    pub fn new(id: JobId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            state: JobState::Pending,
            unreachable_streak: 0,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Consecutive rounds in which the status query failed.
    pub fn unreachable_streak(&self) -> u32 {
        self.unreachable_streak
    }

    pub(crate) fn record_state(&mut self, state: JobState) {
        self.state = state;
        self.unreachable_streak = 0;
    }

    pub(crate) fn record_unreachable(&mut self) -> u32 {
        self.unreachable_streak = self.unreachable_streak.saturating_add(1);
        self.unreachable_streak
    }
}
