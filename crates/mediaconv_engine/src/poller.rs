use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use mediaconv_core::{Batch, Generation, JobId, JobRowView, Observation, TransientErrorPolicy};
use mediaconv_logging::{batch_debug, batch_info, batch_warn};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::JobApi;
use crate::types::EngineEvent;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay before the first round and between round starts.
    pub interval: Duration,
    pub transient: TransientErrorPolicy,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1500),
            transient: TransientErrorPolicy::RetryForever,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed(Batch),
    /// Stopped before completion; the batch is discarded.
    Cancelled,
}

/// Drives one batch to completion by querying every non-terminal job once
/// per round.
#[derive(Clone)]
pub struct StatusPoller {
    api: Arc<dyn JobApi>,
    settings: PollSettings,
}

impl StatusPoller {
    pub fn new(api: Arc<dyn JobApi>, settings: PollSettings) -> Self {
        Self { api, settings }
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Polls until every job is terminal or `cancel` fires.
    ///
    /// Rounds never overlap: a tick that elapses while a round is still in
    /// flight is skipped. Cancellation does not abort the requests of a
    /// round already in flight; their answers are dropped on arrival
    /// without emitting anything. On completion the token is cancelled so
    /// no further round can start.
    pub async fn run(
        &self,
        generation: Generation,
        mut batch: Batch,
        cancel: CancellationToken,
        sink: &dyn ProgressSink,
    ) -> PollOutcome {
        let period = self.settings.interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        batch_info!("polling {} jobs every {:?}", batch.len(), period);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.cancelled(),
                _ = ticker.tick() => {}
            }

            // An in-flight round always runs to the end; a stop only discards it.
            let observations = poll_round(self.api.as_ref(), batch.pending_ids()).await;
            if cancel.is_cancelled() {
                return self.cancelled();
            }

            let outcome = batch.apply_round(observations, self.settings.transient);
            batch_debug!(
                "round finished: {}/{} done",
                outcome.progress.done,
                outcome.progress.total
            );
            sink.emit(EngineEvent::RoundObserved {
                generation,
                progress: outcome.progress,
                jobs: batch.jobs().iter().map(JobRowView::from_job).collect(),
            });

            if outcome.completed {
                cancel.cancel();
                batch_info!("batch complete ({} jobs)", outcome.progress.total);
                sink.emit(EngineEvent::BatchCompleted {
                    generation,
                    batch: batch.clone(),
                });
                return PollOutcome::Completed(batch);
            }
        }
    }

    fn cancelled(&self) -> PollOutcome {
        batch_debug!("polling cancelled");
        PollOutcome::Cancelled
    }
}

/// Queries every id concurrently and waits for all answers.
///
/// A failed query becomes [`Observation::Unreachable`] for that job only.
pub async fn poll_round(api: &dyn JobApi, ids: Vec<JobId>) -> Vec<(JobId, Observation)> {
    let queries = ids.into_iter().map(move |id| async move {
        let observation = match api.status(&id).await {
            Ok(state) => Observation::Reported(state),
            Err(err) => {
                batch_warn!("status of {} unavailable: {}", id, err);
                Observation::Unreachable {
                    reason: err.to_string(),
                }
            }
        };
        (id, observation)
    });
    join_all(queries).await
}
