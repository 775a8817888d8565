use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use mediaconv_core::{Batch, Generation, JobId, ValidatedSubmission};
use mediaconv_logging::{batch_debug, batch_error, set_active_batch};
use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, JobApi};
use crate::bundle::{ResultBundler, DEFAULT_ARCHIVE_NAME};
use crate::http::{ApiSettings, HttpJobApi};
use crate::poller::{ChannelProgressSink, PollSettings, StatusPoller};
use crate::types::EngineEvent;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api: ApiSettings,
    pub poll: PollSettings,
    pub archive_name: String,
}

impl EngineConfig {
    pub fn new(api: ApiSettings) -> Self {
        Self {
            api,
            poll: PollSettings::default(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build api client: {0}")]
    Api(#[from] ApiError),
}

enum EngineCommand {
    Submit {
        generation: Generation,
        submission: ValidatedSubmission,
    },
    StartPolling {
        generation: Generation,
        batch: Batch,
    },
    StopPolling {
        generation: Generation,
    },
    Deliver {
        generation: Generation,
        batch: Batch,
    },
    QueryStatus {
        job_id: JobId,
    },
}

/// Runs the backend IO on a dedicated thread and reports back through
/// [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let api = Arc::new(HttpJobApi::new(config.api)?);
        Self::with_api(api, config.poll, config.archive_name)
    }

    /// Same as [`EngineHandle::new`] over any [`JobApi`] implementation.
    pub fn with_api(
        api: Arc<dyn JobApi>,
        poll: PollSettings,
        archive_name: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let workers = Workers {
            poller: StatusPoller::new(api.clone(), poll),
            bundler: ResultBundler::new(api.clone()).with_archive_name(archive_name),
            api,
        };

        thread::spawn(move || {
            let mut pollers: HashMap<Generation, CancellationToken> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                pollers.retain(|_, token| !token.is_cancelled());
                match command {
                    EngineCommand::StartPolling { generation, batch } => {
                        let token = CancellationToken::new();
                        if let Some(previous) = pollers.insert(generation, token.clone()) {
                            previous.cancel();
                        }
                        let poller = workers.poller.clone();
                        let sink = ChannelProgressSink::new(event_tx.clone());
                        runtime.spawn(async move {
                            poller.run(generation, batch, token, &sink).await;
                        });
                    }
                    EngineCommand::StopPolling { generation } => {
                        if let Some(token) = pollers.remove(&generation) {
                            batch_debug!("stopping poller of batch {}", generation);
                            token.cancel();
                        }
                    }
                    command => {
                        let workers = workers.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_command(&workers, command, event_tx).await;
                        });
                    }
                }
            }
            for token in pollers.values() {
                token.cancel();
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, generation: Generation, submission: ValidatedSubmission) {
        self.send(EngineCommand::Submit {
            generation,
            submission,
        });
    }

    pub fn start_polling(&self, generation: Generation, batch: Batch) {
        self.send(EngineCommand::StartPolling { generation, batch });
    }

    pub fn stop_polling(&self, generation: Generation) {
        self.send(EngineCommand::StopPolling { generation });
    }

    pub fn deliver(&self, generation: Generation, batch: Batch) {
        self.send(EngineCommand::Deliver { generation, batch });
    }

    pub fn query_status(&self, job_id: JobId) {
        self.send(EngineCommand::QueryStatus { job_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            batch_error!("engine thread is gone; command dropped");
        }
    }
}

#[derive(Clone)]
struct Workers {
    api: Arc<dyn JobApi>,
    poller: StatusPoller,
    bundler: ResultBundler,
}

async fn handle_command(
    workers: &Workers,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Submit {
            generation,
            submission,
        } => {
            set_active_batch(generation.value());
            let result = workers
                .api
                .submit(&submission)
                .await
                .map(|tasks| Batch::from_tasks(&submission, tasks));
            let _ = event_tx.send(EngineEvent::Submitted { generation, result });
        }
        EngineCommand::Deliver { generation, batch } => {
            let result = workers.bundler.deliver(&batch).await;
            let _ = event_tx.send(EngineEvent::Delivered { generation, result });
        }
        EngineCommand::QueryStatus { job_id } => {
            let result = workers.api.status(&job_id).await;
            let _ = event_tx.send(EngineEvent::StatusReported { job_id, result });
        }
        EngineCommand::StartPolling { .. } | EngineCommand::StopPolling { .. } => {}
    }
}
