use std::path::{Path, PathBuf};

use mediaconv_core::InputFile;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("{0} does not exist")]
    Missing(PathBuf),
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Expands the command line paths into the files to submit.
///
/// Directories are walked recursively in name order; hidden files and
/// directories below them are skipped. Plain files are taken as given.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>, InputError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            collect_dir(path, &mut files)?;
        } else if path.is_file() {
            files.push(InputFile::from_path(path.clone()));
        } else {
            return Err(InputError::Missing(path.clone()));
        }
    }
    Ok(files)
}

fn collect_dir(root: &Path, files: &mut Vec<InputFile>) -> Result<(), InputError> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(InputFile::from_path(entry.into_path()));
        }
    }
    Ok(())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
