use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use mediaconv_core::{update, JobId, Msg, Phase, SessionState, SubmissionRequest};
use mediaconv_engine::{Delivery, EngineEvent};
use mediaconv_logging::{batch_error, batch_warn, clear_active_batch};

use super::effects::EffectRunner;
use super::logging;
use super::output::{save_delivery, save_report};
use super::persistence::Config;
use super::ui::render::{delivery_line, status_line, ProgressRenderer};
use crate::cli::{Cli, Command};
use crate::inputs;

/// How often the loop wakes up when the engine is quiet.
const TICK: Duration = Duration::from_millis(75);

pub fn run_app(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(cli.server, cli.output);
    logging::init(&config, cli.verbose);

    let engine_config = config.engine_config()?;
    let status_timeout = engine_config.api.request_timeout + Duration::from_secs(5);
    let effects = EffectRunner::new(engine_config).context("failed to start the engine")?;

    let request = match cli.command {
        Command::Convert { paths, target } => {
            let files = inputs::collect_inputs(&paths)?;
            SubmissionRequest::Files { files, target }
        }
        Command::Fetch { url, kind, quality } => SubmissionRequest::RemoteFetch {
            url,
            kind: kind.into(),
            quality,
        },
        Command::Status { task_id } => {
            return print_status(&effects, &task_id, status_timeout);
        }
    };

    let options = SessionOptions {
        deliver: !cli.no_deliver,
        output_dir: config.output_dir.clone(),
    };
    Session::new(&effects, options).run(request)
}

struct SessionOptions {
    pub deliver: bool,
    pub output_dir: PathBuf,
}

/// Drives one submission from the request to the saved results.
struct Session<'a> {
    state: SessionState,
    effects: &'a EffectRunner,
    renderer: ProgressRenderer,
    options: SessionOptions,
    delivery_requested: bool,
    saved_to: Option<PathBuf>,
}

impl<'a> Session<'a> {
    fn new(effects: &'a EffectRunner, options: SessionOptions) -> Self {
        Self {
            state: SessionState::new(),
            effects,
            renderer: ProgressRenderer::new(),
            options,
            delivery_requested: false,
            saved_to: None,
        }
    }

    fn run(mut self, request: SubmissionRequest) -> Result<()> {
        self.dispatch(Msg::SubmitRequested(request));
        loop {
            match self.state.phase() {
                Phase::Idle => {
                    let message = self
                        .state
                        .view()
                        .last_error
                        .unwrap_or_else(|| "submission failed".to_string());
                    bail!(message);
                }
                Phase::Complete if !self.options.deliver => {
                    self.write_report(None);
                    return Ok(());
                }
                Phase::Complete if !self.delivery_requested => {
                    self.delivery_requested = true;
                    self.dispatch(Msg::DeliverRequested);
                    continue;
                }
                Phase::Complete => {
                    let message = self.state.view().last_error.unwrap_or_default();
                    bail!("delivery failed: {message}");
                }
                Phase::Delivered => {
                    if let Some(summary) = self.state.view().delivery {
                        println!("{}", delivery_line(&summary, self.saved_to.as_deref()));
                    }
                    return Ok(());
                }
                Phase::Submitting | Phase::Polling | Phase::Delivering => {}
            }

            match self.effects.next_event(TICK) {
                Some(event) => self.handle_event(event),
                None => self.dispatch(Msg::Tick),
            }
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.renderer.render(&state.view());
        }
        self.state = state;
        self.effects.enqueue(effects);
    }

    fn handle_event(&mut self, event: EngineEvent) {
        let msg = match event {
            EngineEvent::Submitted { generation, result } => match result {
                Ok(batch) => Msg::SubmissionSucceeded { generation, batch },
                Err(err) => {
                    batch_error!("submission failed: {}", err);
                    Msg::SubmissionFailed {
                        generation,
                        message: err.user_message(),
                    }
                }
            },
            EngineEvent::RoundObserved {
                generation,
                progress,
                jobs,
            } => Msg::RoundObserved {
                generation,
                progress,
                jobs,
            },
            EngineEvent::BatchCompleted { generation, batch } => {
                Msg::BatchCompleted { generation, batch }
            }
            EngineEvent::Delivered { generation, result } => {
                if generation != self.state.generation() {
                    return;
                }
                match result.map_err(|err| err.to_string()).and_then(|delivery| {
                    self.store(&delivery)?;
                    Ok(delivery.summary())
                }) {
                    Ok(summary) => Msg::DeliveryFinished {
                        generation,
                        summary,
                    },
                    Err(message) => Msg::DeliveryFailed {
                        generation,
                        message,
                    },
                }
            }
            EngineEvent::StatusReported { .. } => Msg::NoOp,
        };
        self.dispatch(msg);
    }

    fn store(&mut self, delivery: &Delivery) -> Result<(), String> {
        if let Delivery::Unavailable { reason, .. } = delivery {
            batch_warn!("nothing to download: {}", reason);
        }
        self.saved_to = save_delivery(&self.options.output_dir, delivery)
            .map_err(|err| err.to_string())?;
        self.write_report(Some(delivery));
        Ok(())
    }

    fn write_report(&self, delivery: Option<&Delivery>) {
        let Some(batch) = self.state.batch() else {
            return;
        };
        match save_report(&self.options.output_dir, batch, delivery) {
            Ok(path) => println!("report: {}", path.display()),
            Err(err) => batch_warn!("failed to write report: {}", err),
        }
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        clear_active_batch();
    }
}

/// Asks the server for one task's state and prints it.
fn print_status(effects: &EffectRunner, task_id: &str, timeout: Duration) -> Result<()> {
    effects.query_status(JobId::new(task_id));
    let deadline = Instant::now() + timeout;
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match effects.next_event(remaining) {
            Some(EngineEvent::StatusReported { job_id, result }) => {
                let state = result.map_err(|err| anyhow!("status of {job_id} unavailable: {err}"))?;
                println!("{}", status_line(job_id.as_str(), &state));
                return Ok(());
            }
            Some(_) => continue,
            None => break,
        }
    }
    bail!("no answer for {task_id} within {timeout:?}")
}
