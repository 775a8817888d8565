use std::fmt;

use crate::view_model::SessionViewModel;
use crate::{Batch, DeliverySummary, JobRowView, Progress};

/// Identifies one batch lifetime; results tagged with an older generation
/// belong to a superseded batch and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Complete,
    Delivering,
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    generation: Generation,
    phase: Phase,
    /// Present once the poller handed the completed batch back.
    batch: Option<Batch>,
    progress: Option<Progress>,
    rows: Vec<JobRowView>,
    last_error: Option<String>,
    delivery: Option<DeliverySummary>,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn batch(&self) -> Option<&Batch> {
        self.batch.as_ref()
    }

    pub fn view(&self) -> SessionViewModel {
        SessionViewModel {
            phase: self.phase,
            generation: self.generation.value(),
            progress: self.progress,
            jobs: self.rows.clone(),
            last_error: self.last_error.clone(),
            can_deliver: matches!(self.phase, Phase::Complete | Phase::Delivered),
            delivery: self.delivery.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    /// Discards the current batch and opens a new generation.
    pub(crate) fn begin_generation(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.phase = Phase::Idle;
        self.batch = None;
        self.progress = None;
        self.rows.clear();
        self.last_error = None;
        self.delivery = None;
        self.dirty = true;
        self.generation
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase;
            self.dirty = true;
        }
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
        self.dirty = true;
    }

    pub(crate) fn clear_error(&mut self) {
        if self.last_error.take().is_some() {
            self.dirty = true;
        }
    }

    /// Applies a round snapshot. Snapshots that would lower the done count
    /// are ignored.
    pub(crate) fn apply_snapshot(&mut self, progress: Progress, rows: Vec<JobRowView>) -> bool {
        if let Some(current) = self.progress {
            if progress.done < current.done {
                return false;
            }
        }
        self.progress = Some(progress);
        self.rows = rows;
        self.dirty = true;
        true
    }

    pub(crate) fn store_batch(&mut self, batch: Batch) {
        self.progress = Some(batch.progress());
        self.rows = batch.jobs().iter().map(JobRowView::from_job).collect();
        self.batch = Some(batch);
        self.dirty = true;
    }

    pub(crate) fn set_delivery(&mut self, summary: DeliverySummary) {
        self.delivery = Some(summary);
        self.dirty = true;
    }
}
