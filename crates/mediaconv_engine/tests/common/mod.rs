#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use bytes::Bytes;
use mediaconv_core::{
    Batch, FetchKind, InputFile, JobId, JobState, ResultLocation, SubmissionRequest,
    SubmittedTask, ValidatedSubmission,
};
use mediaconv_engine::{
    ApiError, ApiFailureKind, EngineEvent, JobApi, PollSettings, ProgressSink, SubmitError,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(mediaconv_logging::initialize_for_tests);
}

pub fn fast_poll() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(10),
        ..PollSettings::default()
    }
}

pub fn success(location: &str) -> Result<JobState, ApiError> {
    Ok(JobState::Success {
        location: ResultLocation::new(location).unwrap(),
    })
}

pub fn failure(info: &str) -> Result<JobState, ApiError> {
    Ok(JobState::Failure {
        info: info.to_string(),
    })
}

pub fn running() -> Result<JobState, ApiError> {
    Ok(JobState::Running)
}

pub fn unreachable() -> Result<JobState, ApiError> {
    Err(ApiError::new(ApiFailureKind::Timeout, "operation timed out"))
}

/// In-process backend answering from per-job scripts.
///
/// Each status query consumes the next scripted answer; the last answer
/// repeats once the script is exhausted.
#[derive(Default)]
pub struct ScriptedApi {
    statuses: Mutex<HashMap<JobId, VecDeque<Result<JobState, ApiError>>>>,
    artifacts: Mutex<HashMap<String, Bytes>>,
    submit_result: Mutex<Option<Result<Vec<SubmittedTask>, SubmitError>>>,
    status_calls: Mutex<HashMap<JobId, usize>>,
    in_flight: Mutex<HashMap<JobId, (usize, usize)>>,
    status_delay: Option<Duration>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    pub fn script(self, id: &str, answers: Vec<Result<JobState, ApiError>>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(JobId::new(id), answers.into_iter().collect());
        self
    }

    pub fn artifact(self, location: &str, bytes: &'static [u8]) -> Self {
        self.artifacts
            .lock()
            .unwrap()
            .insert(location.to_string(), Bytes::from_static(bytes));
        self
    }

    pub fn on_submit(self, result: Result<Vec<SubmittedTask>, SubmitError>) -> Self {
        *self.submit_result.lock().unwrap() = Some(result);
        self
    }

    pub fn status_calls(&self, id: &str) -> usize {
        self.status_calls
            .lock()
            .unwrap()
            .get(&JobId::new(id))
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of concurrent status queries seen for `id`.
    pub fn max_in_flight(&self, id: &str) -> usize {
        self.in_flight
            .lock()
            .unwrap()
            .get(&JobId::new(id))
            .map(|(_, max)| *max)
            .unwrap_or(0)
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl JobApi for ScriptedApi {
    async fn submit(
        &self,
        _submission: &ValidatedSubmission,
    ) -> Result<Vec<SubmittedTask>, SubmitError> {
        self.submit_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(SubmitError::Malformed("no script".to_string())))
    }

    async fn status(&self, job_id: &JobId) -> Result<JobState, ApiError> {
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            let (current, max) = in_flight.entry(job_id.clone()).or_default();
            *current += 1;
            *max = (*max).max(*current);
        }
        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((current, _)) = self.in_flight.lock().unwrap().get_mut(job_id) {
            *current -= 1;
        }
        *self
            .status_calls
            .lock()
            .unwrap()
            .entry(job_id.clone())
            .or_default() += 1;

        let mut statuses = self.statuses.lock().unwrap();
        let Some(script) = statuses.get_mut(job_id) else {
            return Err(ApiError::new(ApiFailureKind::HttpStatus(404), "unknown task"));
        };
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }

    async fn fetch_artifact(&self, location: &ResultLocation) -> Result<Bytes, ApiError> {
        self.artifacts
            .lock()
            .unwrap()
            .get(location.as_str())
            .cloned()
            .ok_or_else(|| ApiError::new(ApiFailureKind::HttpStatus(404), "no such artifact"))
    }
}

#[derive(Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn files_submission(names: &[&str], target: &str) -> ValidatedSubmission {
    SubmissionRequest::Files {
        files: names.iter().map(|name| InputFile::from_path(*name)).collect(),
        target: Some(target.to_string()),
    }
    .validate()
    .unwrap()
}

pub fn fetch_submission(url: &str) -> ValidatedSubmission {
    SubmissionRequest::RemoteFetch {
        url: url.to_string(),
        kind: FetchKind::Audio,
        quality: None,
    }
    .validate()
    .unwrap()
}

/// Tasks `t0`, `t1`, ... named after the inputs, in order.
pub fn tasks_for(names: &[&str]) -> Vec<SubmittedTask> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| SubmittedTask {
            id: JobId::new(format!("t{i}")),
            name: name.to_string(),
        })
        .collect()
}

pub fn batch_of(names: &[&str], target: &str) -> Batch {
    Batch::from_tasks(&files_submission(names, target), tasks_for(names))
}
