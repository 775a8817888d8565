use std::time::Duration;

use mediaconv_core::{Effect, JobId};
use mediaconv_engine::{EngineConfig, EngineEvent, EngineHandle};
use mediaconv_logging::{batch_debug, batch_info};

/// Executes the effects produced by `update` on the engine.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig) -> anyhow::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(config)?,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Submit {
                    generation,
                    submission,
                } => {
                    batch_info!(
                        "submitting {} job(s) as batch {}",
                        submission.job_count(),
                        generation
                    );
                    self.engine.submit(generation, submission);
                }
                Effect::StartPolling { generation, batch } => {
                    self.engine.start_polling(generation, batch);
                }
                Effect::StopPolling { generation } => {
                    batch_debug!("stop polling batch {}", generation);
                    self.engine.stop_polling(generation);
                }
                Effect::NotifyCompleted {
                    generation,
                    progress,
                } => {
                    batch_info!(
                        "batch {} complete: {}/{} jobs finished",
                        generation,
                        progress.done,
                        progress.total
                    );
                }
                Effect::Deliver { generation, batch } => {
                    self.engine.deliver(generation, batch);
                }
            }
        }
    }

    pub fn query_status(&self, job_id: JobId) {
        self.engine.query_status(job_id);
    }

    pub fn next_event(&self, timeout: Duration) -> Option<EngineEvent> {
        self.engine.recv_timeout(timeout)
    }
}
