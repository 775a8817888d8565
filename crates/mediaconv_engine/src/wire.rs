//! JSON bodies exchanged with the conversion backend.

use mediaconv_core::{JobId, JobState, ResultLocation, SubmittedTask};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct BatchCreated {
    #[serde(default)]
    tasks: Vec<TaskEntry>,
}

#[derive(Debug, Deserialize)]
struct TaskEntry {
    name: String,
    task_id: String,
}

impl BatchCreated {
    pub(crate) fn into_tasks(self) -> Vec<SubmittedTask> {
        self.tasks
            .into_iter()
            .map(|task| SubmittedTask {
                id: JobId::new(task.task_id),
                name: task.name,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskCreated {
    pub(crate) task_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusBody {
    state: String,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    info: Option<Value>,
}

impl StatusBody {
    /// Maps the backend's task states onto the four client states.
    pub(crate) fn into_state(self) -> JobState {
        match self.state.to_ascii_uppercase().as_str() {
            "PENDING" => JobState::Pending,
            "SUCCESS" => {
                let location = self
                    .result
                    .as_ref()
                    .and_then(|result| result.get("download_url"))
                    .and_then(Value::as_str)
                    .and_then(ResultLocation::new);
                match location {
                    Some(location) => JobState::Success { location },
                    None => JobState::Failure {
                        info: "finished without a result location".to_string(),
                    },
                }
            }
            "FAILURE" | "REVOKED" => JobState::Failure {
                info: describe_info(self.info.as_ref()),
            },
            _ => JobState::Running,
        }
    }
}

fn describe_info(info: Option<&Value>) -> String {
    match info {
        Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
        Some(Value::Null) | None => "job failed".to_string(),
        Some(Value::String(_)) => "job failed".to_string(),
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// Extracts the human readable `detail` of an error body, if any.
///
/// Validation errors carry a list of `{ "msg": ... }` objects instead of a string.
pub(crate) fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        Value::String(text) if !text.trim().is_empty() => Some(text),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_of(json: &str) -> JobState {
        serde_json::from_str::<StatusBody>(json).unwrap().into_state()
    }

    #[test]
    fn success_without_url_is_a_failure() {
        assert_eq!(
            state_of(r#"{"state":"SUCCESS","result":{"log":""}}"#),
            JobState::Failure {
                info: "finished without a result location".to_string()
            }
        );
    }

    #[test]
    fn intermediate_states_count_as_running() {
        for state in ["STARTED", "RETRY", "RECEIVED"] {
            assert_eq!(
                state_of(&format!(r#"{{"state":"{state}","info":"None"}}"#)),
                JobState::Running
            );
        }
    }

    #[test]
    fn failure_info_is_kept() {
        assert_eq!(
            state_of(r#"{"state":"FAILURE","info":"formato de video no soportado"}"#),
            JobState::Failure {
                info: "formato de video no soportado".to_string()
            }
        );
        assert_eq!(
            state_of(r#"{"state":"REVOKED","info":null}"#),
            JobState::Failure {
                info: "job failed".to_string()
            }
        );
    }

    #[test]
    fn validation_error_details_are_joined() {
        let body = br#"{"detail":[{"msg":"field required"},{"msg":"bad kind"}]}"#;
        assert_eq!(
            error_detail(body).as_deref(),
            Some("field required; bad kind")
        );
        assert_eq!(error_detail(b"<html>oops</html>"), None);
    }
}
