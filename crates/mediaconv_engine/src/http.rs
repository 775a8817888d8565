use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use mediaconv_core::{
    InputFile, JobId, JobState, ResultLocation, SubmittedTask, ValidatedSubmission,
};
use mediaconv_logging::{batch_debug, batch_info};
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::api::{ApiError, ApiFailureKind, JobApi, SubmitError};
use crate::wire::{self, BatchCreated, StatusBody, TaskCreated};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Root of the backend, e.g. `http://localhost:8000/`.
    pub base_url: Url,
    pub connect_timeout: Duration,
    /// Timeout for status queries.
    pub request_timeout: Duration,
    /// Timeout for uploads and artifact downloads.
    pub transfer_timeout: Duration,
    pub max_artifact_bytes: u64,
}

impl ApiSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            transfer_timeout: Duration::from_secs(600),
            max_artifact_bytes: 512 * 1024 * 1024,
        }
    }
}

/// [`JobApi`] over the backend's HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HttpJobApi {
    client: reqwest::Client,
    settings: ApiSettings,
}

impl HttpJobApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(ApiFailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::new(
                    ApiFailureKind::InvalidUrl,
                    format!("{} cannot be a base url", self.settings.base_url),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_form(&self, segments: &[&str], form: Form) -> Result<Bytes, SubmitError> {
        let url = self.endpoint(segments).map_err(SubmitError::Transport)?;
        batch_debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .multipart(form)
            .timeout(self.settings.transfer_timeout)
            .send()
            .await
            .map_err(|err| SubmitError::Transport(map_reqwest_error(err)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| SubmitError::Transport(map_reqwest_error(err)))?;
        if !status.is_success() {
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                detail: wire::error_detail(&body),
            });
        }
        Ok(body)
    }
}

async fn file_part(file: &InputFile) -> Result<Part, SubmitError> {
    let data = tokio::fs::read(&file.path)
        .await
        .map_err(|err| SubmitError::ReadInput {
            path: file.path.display().to_string(),
            message: err.to_string(),
        })?;
    Ok(Part::bytes(data).file_name(file.display_name.clone()))
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, SubmitError> {
    serde_json::from_slice(body).map_err(|err| SubmitError::Malformed(err.to_string()))
}

#[async_trait::async_trait]
impl JobApi for HttpJobApi {
    async fn submit(
        &self,
        submission: &ValidatedSubmission,
    ) -> Result<Vec<SubmittedTask>, SubmitError> {
        match submission {
            ValidatedSubmission::Folder {
                kind,
                target,
                files,
            } => {
                let mut form = Form::new()
                    .text("kind", kind.as_str())
                    .text("target", target.to_string());
                for file in files {
                    form = form.part("files", file_part(file).await?);
                }
                let body = self.post_form(&["api", "convert", "batch"], form).await?;
                let tasks = parse_body::<BatchCreated>(&body)?.into_tasks();
                batch_info!("backend created {} jobs for {} files", tasks.len(), files.len());
                Ok(tasks)
            }
            ValidatedSubmission::SingleFile { kind, target, file } => {
                let form = Form::new()
                    .part("file", file_part(file).await?)
                    .text("kind", kind.as_str())
                    .text("target", target.to_string());
                let body = self.post_form(&["convert"], form).await?;
                let created: TaskCreated = parse_body(&body)?;
                Ok(vec![SubmittedTask {
                    id: JobId::new(created.task_id),
                    name: file.display_name.clone(),
                }])
            }
            ValidatedSubmission::RemoteFetch { url, kind, quality } => {
                let form = Form::new()
                    .text("url", url.to_string())
                    .text("kind", kind.as_str())
                    .text("quality", quality.clone());
                let body = self.post_form(&["fetch"], form).await?;
                let created: TaskCreated = parse_body(&body)?;
                Ok(vec![SubmittedTask {
                    id: JobId::new(created.task_id),
                    name: url.to_string(),
                }])
            }
        }
    }

    async fn status(&self, job_id: &JobId) -> Result<JobState, ApiError> {
        let url = self.endpoint(&["status", job_id.as_str()])?;
        let response = self
            .client
            .get(url)
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                ApiFailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let parsed: StatusBody = serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(ApiFailureKind::Malformed, err.to_string()))?;
        Ok(parsed.into_state())
    }

    async fn fetch_artifact(&self, location: &ResultLocation) -> Result<Bytes, ApiError> {
        // Relative locations are resolved against the backend root.
        let url = self
            .settings
            .base_url
            .join(location.as_str())
            .map_err(|err| ApiError::new(ApiFailureKind::InvalidUrl, err.to_string()))?;
        let max_bytes = self.settings.max_artifact_bytes;

        let response = self
            .client
            .get(url)
            .timeout(self.settings.transfer_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                ApiFailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ApiError::new(
                    ApiFailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "artifact too large",
                ));
            }
        }

        let mut bytes = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ApiError::new(
                    ApiFailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "artifact too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes.freeze())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(ApiFailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ApiError::new(ApiFailureKind::InvalidUrl, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(ApiFailureKind::Malformed, err.to_string());
    }
    ApiError::new(ApiFailureKind::Network, err.to_string())
}
