use crate::{Effect, JobRowView, Msg, Phase, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmitRequested(request) => {
            let submission = match request.validate() {
                Ok(submission) => submission,
                Err(err) => {
                    state.set_error(err.to_string());
                    return (state, Vec::new());
                }
            };

            // A new batch replaces whatever was being tracked.
            let mut effects = Vec::with_capacity(2);
            if state.phase() == Phase::Polling {
                effects.push(Effect::StopPolling {
                    generation: state.generation(),
                });
            }
            let generation = state.begin_generation();
            state.set_phase(Phase::Submitting);
            effects.push(Effect::Submit {
                generation,
                submission,
            });
            effects
        }
        Msg::SubmissionSucceeded { generation, batch } => {
            if !state.is_current(generation) || state.phase() != Phase::Submitting {
                return (state, Vec::new());
            }
            let progress = batch.progress();
            let rows = batch.jobs().iter().map(JobRowView::from_job).collect();
            state.apply_snapshot(progress, rows);
            state.set_phase(Phase::Polling);
            vec![Effect::StartPolling { generation, batch }]
        }
        Msg::SubmissionFailed {
            generation,
            message,
        } => {
            if state.is_current(generation) && state.phase() == Phase::Submitting {
                state.set_phase(Phase::Idle);
                state.set_error(message);
            }
            Vec::new()
        }
        Msg::RoundObserved {
            generation,
            progress,
            jobs,
        } => {
            if state.is_current(generation) && state.phase() == Phase::Polling {
                state.apply_snapshot(progress, jobs);
            }
            Vec::new()
        }
        Msg::BatchCompleted { generation, batch } => {
            if !state.is_current(generation) || state.phase() != Phase::Polling {
                return (state, Vec::new());
            }
            let progress = batch.progress();
            state.store_batch(batch);
            state.set_phase(Phase::Complete);
            vec![Effect::NotifyCompleted {
                generation,
                progress,
            }]
        }
        Msg::DeliverRequested => match (state.phase(), state.batch().cloned()) {
            (Phase::Complete | Phase::Delivered, Some(batch)) => {
                state.clear_error();
                state.set_phase(Phase::Delivering);
                vec![Effect::Deliver {
                    generation: state.generation(),
                    batch,
                }]
            }
            _ => Vec::new(),
        },
        Msg::DeliveryFinished {
            generation,
            summary,
        } => {
            if state.is_current(generation) && state.phase() == Phase::Delivering {
                state.set_delivery(summary);
                state.set_phase(Phase::Delivered);
            }
            Vec::new()
        }
        Msg::DeliveryFailed {
            generation,
            message,
        } => {
            if state.is_current(generation) && state.phase() == Phase::Delivering {
                state.set_phase(Phase::Complete);
                state.set_error(message);
            }
            Vec::new()
        }
        Msg::ResetRequested => {
            let mut effects = Vec::new();
            if state.phase() == Phase::Polling {
                effects.push(Effect::StopPolling {
                    generation: state.generation(),
                });
            }
            state.begin_generation();
            effects
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
