use mediaconv_core::{
    Batch, DeliveryMode, FetchKind, InputFile, JobId, JobState, MediaKind, OutputTarget,
    PreconditionError, SubmissionRequest, SubmittedTask, TargetFormat, ValidatedSubmission,
};
use pretty_assertions::assert_eq;

fn files(names: &[&str]) -> Vec<InputFile> {
    names
        .iter()
        .map(|name| InputFile::from_path(format!("/tmp/in/{name}")))
        .collect()
}

fn files_request(names: &[&str], target: Option<&str>) -> SubmissionRequest {
    SubmissionRequest::Files {
        files: files(names),
        target: target.map(str::to_string),
    }
}

#[test]
fn empty_file_set_is_rejected() {
    let err = files_request(&[], Some("png")).validate().unwrap_err();
    assert_eq!(err, PreconditionError::NoFiles);
}

#[test]
fn mixed_kinds_are_rejected() {
    let err = files_request(&["a.jpg", "b.mp4"], Some("png"))
        .validate()
        .unwrap_err();
    assert_eq!(
        err,
        PreconditionError::MixedKinds {
            kinds: vec![MediaKind::Image, MediaKind::Video]
        }
    );
    assert_eq!(
        err.to_string(),
        "all files must be of the same kind (found image, video)"
    );
}

#[test]
fn unknown_extension_is_rejected() {
    let err = files_request(&["a.jpg", "notes.txt"], Some("png"))
        .validate()
        .unwrap_err();
    assert_eq!(
        err,
        PreconditionError::UnsupportedFile {
            name: "notes.txt".to_string()
        }
    );
}

#[test]
fn missing_or_blank_target_is_rejected() {
    assert_eq!(
        files_request(&["a.jpg"], None).validate().unwrap_err(),
        PreconditionError::MissingTarget
    );
    assert_eq!(
        files_request(&["a.jpg"], Some("  ")).validate().unwrap_err(),
        PreconditionError::MissingTarget
    );
}

#[test]
fn target_must_belong_to_the_kind_catalog() {
    let err = files_request(&["a.jpg"], Some("mp4")).validate().unwrap_err();
    assert_eq!(
        err,
        PreconditionError::TargetNotAllowed {
            kind: MediaKind::Image,
            target: "mp4".to_string()
        }
    );
}

#[test]
fn audio_has_no_conversion_targets() {
    let err = files_request(&["a.mp3", "b.wav"], Some("ogg"))
        .validate()
        .unwrap_err();
    assert!(matches!(
        err,
        PreconditionError::TargetNotAllowed {
            kind: MediaKind::Audio,
            ..
        }
    ));
}

#[test]
fn extensions_and_targets_are_case_insensitive() {
    let validated = files_request(&["A.JPG", "b.Jpeg"], Some(".PNG"))
        .validate()
        .unwrap();
    match validated {
        ValidatedSubmission::Folder {
            kind,
            target,
            files,
        } => {
            assert_eq!(kind, MediaKind::Image);
            assert_eq!(target.as_str(), "png");
            assert_eq!(files.len(), 2);
        }
        other => panic!("expected folder submission, got {other:?}"),
    }
}

#[test]
fn one_file_is_a_single_file_submission() {
    let validated = files_request(&["clip.mov"], Some("mp4")).validate().unwrap();
    assert!(matches!(
        validated,
        ValidatedSubmission::SingleFile {
            kind: MediaKind::Video,
            ..
        }
    ));
    assert_eq!(validated.job_count(), 1);
}

#[test]
fn remote_fetch_requires_http_url() {
    for url in ["", "ftp://example.com/a", "not a url"] {
        let err = SubmissionRequest::RemoteFetch {
            url: url.to_string(),
            kind: FetchKind::Video,
            quality: None,
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, PreconditionError::InvalidUrl { .. }), "{url}");
    }
}

#[test]
fn remote_fetch_checks_quality_per_kind() {
    let err = SubmissionRequest::RemoteFetch {
        url: "https://media.example/watch?v=1".to_string(),
        kind: FetchKind::Audio,
        quality: Some("720p".to_string()),
    }
    .validate()
    .unwrap_err();
    assert_eq!(
        err,
        PreconditionError::QualityNotAllowed {
            kind: FetchKind::Audio,
            quality: "720p".to_string()
        }
    );

    let ok = SubmissionRequest::RemoteFetch {
        url: " https://media.example/watch?v=1 ".to_string(),
        kind: FetchKind::Video,
        quality: None,
    }
    .validate()
    .unwrap();
    match ok {
        ValidatedSubmission::RemoteFetch { url, quality, .. } => {
            assert_eq!(url.as_str(), "https://media.example/watch?v=1");
            assert_eq!(quality, "best");
        }
        other => panic!("expected remote fetch, got {other:?}"),
    }
}

#[test]
fn batch_is_built_in_submission_order() {
    let validated = files_request(&["b.png", "a.png"], Some("webp"))
        .validate()
        .unwrap();
    let batch = Batch::from_tasks(
        &validated,
        vec![
            SubmittedTask {
                id: JobId::new("id-b"),
                name: "b.png".to_string(),
            },
            SubmittedTask {
                id: JobId::new("id-a"),
                name: "a.png".to_string(),
            },
        ],
    );

    let names: Vec<_> = batch.jobs().iter().map(|j| j.display_name()).collect();
    assert_eq!(names, vec!["b.png", "a.png"]);
    assert!(batch.jobs().iter().all(|j| j.state() == &JobState::Pending));
    assert_eq!(batch.delivery(), DeliveryMode::Archive);
    assert_eq!(
        batch.output(),
        &OutputTarget::Format(TargetFormat::parse("webp").unwrap())
    );
}

#[test]
fn remote_fetch_batch_is_server_named_and_direct() {
    let validated = SubmissionRequest::RemoteFetch {
        url: "https://media.example/v".to_string(),
        kind: FetchKind::Audio,
        quality: Some("128k".to_string()),
    }
    .validate()
    .unwrap();
    let batch = Batch::from_tasks(
        &validated,
        vec![SubmittedTask {
            id: JobId::new("f1"),
            name: "https://media.example/v".to_string(),
        }],
    );
    assert_eq!(batch.output(), &OutputTarget::ServerNamed);
    assert_eq!(batch.delivery(), DeliveryMode::Direct);
}
