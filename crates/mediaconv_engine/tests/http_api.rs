mod common;

use std::fs;
use std::time::Duration;

use common::init_logging;
use mediaconv_core::{
    FetchKind, InputFile, JobId, JobState, ResultLocation, SubmissionRequest, ValidatedSubmission,
};
use mediaconv_engine::{ApiFailureKind, ApiSettings, HttpJobApi, JobApi, SubmitError};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> HttpJobApi {
    let base = Url::parse(&format!("{}/", server.uri())).unwrap();
    HttpJobApi::new(ApiSettings::new(base)).unwrap()
}

fn folder_in(dir: &TempDir, names: &[&str]) -> ValidatedSubmission {
    let files = names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, format!("bytes of {name}")).unwrap();
            InputFile::from_path(path)
        })
        .collect();
    SubmissionRequest::Files {
        files,
        target: Some("png".to_string()),
    }
    .validate()
    .unwrap()
}

#[tokio::test]
async fn folder_submission_posts_every_file_to_the_batch_endpoint() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert/batch"))
        .and(body_string_contains("name=\"kind\""))
        .and(body_string_contains("bytes of b.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tasks": [
                { "name": "a.jpg", "task_id": "id-a" },
                { "name": "b.jpg", "task_id": "id-b" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let tasks = api_for(&server)
        .submit(&folder_in(&dir, &["a.jpg", "b.jpg"]))
        .await
        .expect("submit ok");

    let ids: Vec<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids, vec!["id-a", "id-b"]);
    assert_eq!(tasks[1].name, "b.jpg");
}

#[tokio::test]
async fn rejection_detail_is_surfaced() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert/batch"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "No se recibió ningún archivo"
        })))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let err = api_for(&server)
        .submit(&folder_in(&dir, &["a.jpg", "b.jpg"]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SubmitError::Rejected {
            status: 400,
            detail: Some("No se recibió ningún archivo".to_string())
        }
    );
    assert_eq!(err.user_message(), "No se recibió ningún archivo");
}

#[tokio::test]
async fn rejection_without_detail_uses_generic_message() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert/batch"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let err = api_for(&server)
        .submit(&folder_in(&dir, &["a.jpg", "b.jpg"]))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::Rejected { status: 502, detail: None }));
    assert_eq!(err.user_message(), "submission failed");
}

#[tokio::test]
async fn single_file_uses_the_convert_endpoint() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .and(body_string_contains("name=\"file\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "task_id": "solo" })))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let tasks = api_for(&server)
        .submit(&folder_in(&dir, &["only.png"]))
        .await
        .unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, JobId::new("solo"));
    assert_eq!(tasks[0].name, "only.png");
}

#[tokio::test]
async fn remote_fetch_sends_url_kind_and_quality() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fetch"))
        .and(body_string_contains("https://media.example/v/1"))
        .and(body_string_contains("720p"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "task_id": "f1" })))
        .mount(&server)
        .await;
    let submission = SubmissionRequest::RemoteFetch {
        url: "https://media.example/v/1".to_string(),
        kind: FetchKind::Video,
        quality: Some("720p".to_string()),
    }
    .validate()
    .unwrap();

    let tasks = api_for(&server).submit(&submission).await.unwrap();

    assert_eq!(tasks[0].id, JobId::new("f1"));
}

#[tokio::test]
async fn unreadable_input_fails_before_any_request() {
    init_logging();
    let server = MockServer::start().await;
    let submission = SubmissionRequest::Files {
        files: vec![InputFile::from_path("/definitely/not/here.jpg")],
        target: Some("png".to_string()),
    }
    .validate()
    .unwrap();

    let err = api_for(&server).submit(&submission).await.unwrap_err();

    assert!(matches!(err, SubmitError::ReadInput { .. }));
    assert!(err.user_message().starts_with("submission failed: failed to read"));
}

#[tokio::test]
async fn status_maps_backend_states() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/done"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "SUCCESS",
            "result": { "download_url": "http://minio/out/a.png", "log": "" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/busy"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "state": "STARTED", "info": "None" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/queued"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "state": "PENDING", "info": null })),
        )
        .mount(&server)
        .await;
    let api = api_for(&server);

    assert_eq!(
        api.status(&JobId::new("done")).await.unwrap(),
        JobState::Success {
            location: ResultLocation::new("http://minio/out/a.png").unwrap()
        }
    );
    assert_eq!(api.status(&JobId::new("busy")).await.unwrap(), JobState::Running);
    assert_eq!(api.status(&JobId::new("queued")).await.unwrap(), JobState::Pending);
}

#[tokio::test]
async fn status_http_error_is_reported() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .status(&JobId::new("gone"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ApiFailureKind::HttpStatus(500));
}

#[tokio::test]
async fn slow_status_times_out() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({ "state": "PENDING" })),
        )
        .mount(&server)
        .await;
    let base = Url::parse(&format!("{}/", server.uri())).unwrap();
    let settings = ApiSettings {
        request_timeout: Duration::from_millis(200),
        ..ApiSettings::new(base)
    };

    let err = HttpJobApi::new(settings)
        .unwrap()
        .status(&JobId::new("slow"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ApiFailureKind::Timeout);
}

#[tokio::test]
async fn artifacts_are_downloaded_from_relative_locations() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/out.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png-bytes".to_vec()))
        .mount(&server)
        .await;

    let bytes = api_for(&server)
        .fetch_artifact(&ResultLocation::new("/files/out.png").unwrap())
        .await
        .unwrap();

    assert_eq!(&bytes[..], b"png-bytes");
}

#[tokio::test]
async fn oversized_artifacts_are_refused() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/big.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
        .mount(&server)
        .await;
    let base = Url::parse(&format!("{}/", server.uri())).unwrap();
    let settings = ApiSettings {
        max_artifact_bytes: 1024,
        ..ApiSettings::new(base)
    };
    let location = ResultLocation::new(format!("{}/files/big.mp4", server.uri())).unwrap();

    let err = HttpJobApi::new(settings)
        .unwrap()
        .fetch_artifact(&location)
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind,
        ApiFailureKind::TooLarge { max_bytes: 1024, .. }
    ));
}
