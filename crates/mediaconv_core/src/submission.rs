use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::{FetchKind, JobId, MediaKind, TargetFormat};

/// A local file selected for conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    /// Name sent to the backend and used to name the output.
    pub display_name: String,
}

impl InputFile {
    /// Uses the final path component as display name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, display_name }
    }
}

/// What the user asked to submit, before any precondition was checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionRequest {
    Files {
        files: Vec<InputFile>,
        target: Option<String>,
    },
    RemoteFetch {
        url: String,
        kind: FetchKind,
        quality: Option<String>,
    },
}

/// A submission that passed every precondition and may be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedSubmission {
    SingleFile {
        kind: MediaKind,
        target: TargetFormat,
        file: InputFile,
    },
    Folder {
        kind: MediaKind,
        target: TargetFormat,
        files: Vec<InputFile>,
    },
    RemoteFetch {
        url: url::Url,
        kind: FetchKind,
        quality: String,
    },
}

impl ValidatedSubmission {
    pub fn job_count(&self) -> usize {
        match self {
            ValidatedSubmission::Folder { files, .. } => files.len(),
            ValidatedSubmission::SingleFile { .. } | ValidatedSubmission::RemoteFetch { .. } => 1,
        }
    }
}

/// One job created by a submission, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTask {
    pub id: JobId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("select at least one file")]
    NoFiles,
    #[error("unsupported file type: {name}")]
    UnsupportedFile { name: String },
    #[error("all files must be of the same kind (found {})", join_kinds(.kinds))]
    MixedKinds { kinds: Vec<MediaKind> },
    #[error("choose an output format")]
    MissingTarget,
    #[error("{kind} files cannot be converted to {target}")]
    TargetNotAllowed { kind: MediaKind, target: String },
    #[error("not a valid http(s) url: {url:?}")]
    InvalidUrl { url: String },
    #[error("quality {quality:?} is not available for {kind} downloads")]
    QualityNotAllowed { kind: FetchKind, quality: String },
}

fn join_kinds(kinds: &[MediaKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SubmissionRequest {
    /// Checks every precondition without touching the network.
    pub fn validate(&self) -> Result<ValidatedSubmission, PreconditionError> {
        match self {
            SubmissionRequest::Files { files, target } => validate_files(files, target.as_deref()),
            SubmissionRequest::RemoteFetch { url, kind, quality } => {
                validate_fetch(url, *kind, quality.as_deref())
            }
        }
    }
}

fn validate_files(
    files: &[InputFile],
    target: Option<&str>,
) -> Result<ValidatedSubmission, PreconditionError> {
    if files.is_empty() {
        return Err(PreconditionError::NoFiles);
    }

    let mut kinds = BTreeSet::new();
    for file in files {
        let kind = MediaKind::detect(&file.display_name).ok_or_else(|| {
            PreconditionError::UnsupportedFile {
                name: file.display_name.clone(),
            }
        })?;
        kinds.insert(kind);
    }
    if kinds.len() != 1 {
        return Err(PreconditionError::MixedKinds {
            kinds: kinds.into_iter().collect(),
        });
    }
    let kind = kinds
        .into_iter()
        .next()
        .ok_or(PreconditionError::NoFiles)?;

    let target = target
        .and_then(TargetFormat::parse)
        .ok_or(PreconditionError::MissingTarget)?;
    if !kind.allows(&target) {
        return Err(PreconditionError::TargetNotAllowed {
            kind,
            target: target.to_string(),
        });
    }

    Ok(match files {
        [file] => ValidatedSubmission::SingleFile {
            kind,
            target,
            file: file.clone(),
        },
        _ => ValidatedSubmission::Folder {
            kind,
            target,
            files: files.to_vec(),
        },
    })
}

fn validate_fetch(
    raw_url: &str,
    kind: FetchKind,
    quality: Option<&str>,
) -> Result<ValidatedSubmission, PreconditionError> {
    let trimmed = raw_url.trim();
    let invalid = || PreconditionError::InvalidUrl {
        url: raw_url.to_string(),
    };
    let url = url::Url::parse(trimmed).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }

    let quality = quality
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(FetchKind::DEFAULT_QUALITY)
        .to_ascii_lowercase();
    if !kind.qualities().contains(&quality.as_str()) {
        return Err(PreconditionError::QualityNotAllowed { kind, quality });
    }

    Ok(ValidatedSubmission::RemoteFetch { url, kind, quality })
}
