//! Plain-text rendering of the session view model.

use std::path::Path;

use mediaconv_core::{DeliverySummary, JobRowView, JobState, JobStatus, Phase, Progress, SessionViewModel};

/// Prints progress only when it changed since the previous render.
#[derive(Debug, Default)]
pub struct ProgressRenderer {
    last_phase: Option<Phase>,
    last_progress: Option<Progress>,
}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &SessionViewModel) {
        for line in self.lines(view) {
            eprintln!("{line}");
        }
    }

    fn lines(&mut self, view: &SessionViewModel) -> Vec<String> {
        let mut lines = Vec::new();
        let phase_changed = self.last_phase != Some(view.phase);
        if phase_changed {
            if let Some(line) = phase_line(view.phase) {
                lines.push(line.to_string());
            }
        }
        if view.progress != self.last_progress {
            if let Some(progress) = view.progress {
                lines.push(progress_line(&progress));
            }
        }
        if phase_changed && view.phase == Phase::Complete {
            lines.extend(job_lines(&view.jobs));
        }
        self.last_phase = Some(view.phase);
        self.last_progress = view.progress;
        lines
    }
}

fn phase_line(phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::Idle => None,
        Phase::Submitting => Some("uploading..."),
        Phase::Polling => Some("waiting for the server..."),
        Phase::Complete => Some("all jobs finished"),
        Phase::Delivering => Some("downloading results..."),
        Phase::Delivered => None,
    }
}

pub fn progress_line(progress: &Progress) -> String {
    let percent = if progress.total == 0 {
        100
    } else {
        progress.done * 100 / progress.total
    };
    format!("[{}/{}] {percent}%", progress.done, progress.total)
}

pub fn job_lines(jobs: &[JobRowView]) -> Vec<String> {
    jobs.iter()
        .map(|job| match (&job.status, &job.detail) {
            (JobStatus::Failed, Some(detail)) => format!("  failed   {}: {detail}", job.name),
            (status, _) => format!("  {:<8} {}", status_label(*status), job.name),
        })
        .collect()
}

fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "pending",
        JobStatus::Running => "running",
        JobStatus::Succeeded => "ok",
        JobStatus::Failed => "failed",
    }
}

pub fn delivery_line(summary: &DeliverySummary, saved_to: Option<&Path>) -> String {
    match saved_to {
        Some(path) if summary.skipped > 0 => format!(
            "saved {} ({} files, {} skipped)",
            path.display(),
            summary.entries,
            summary.skipped
        ),
        Some(path) => format!("saved {} ({} files)", path.display(), summary.entries),
        None => "nothing to download".to_string(),
    }
}

pub fn status_line(task_id: &str, state: &JobState) -> String {
    match state {
        JobState::Success { location } => format!("{task_id}: SUCCESS {location}"),
        JobState::Failure { info } => format!("{task_id}: FAILURE {info}"),
        other => format!("{task_id}: {}", other.label()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediaconv_core::JobId;
    use pretty_assertions::assert_eq;

    fn row(name: &str, status: JobStatus, detail: Option<&str>) -> JobRowView {
        JobRowView {
            job_id: JobId::new(name),
            name: name.to_string(),
            status,
            detail: detail.map(str::to_string),
        }
    }

    #[test]
    fn progress_is_rendered_once_per_change() {
        let mut renderer = ProgressRenderer::new();
        let mut view = SessionViewModel {
            phase: Phase::Polling,
            progress: Some(Progress { done: 1, total: 3 }),
            ..SessionViewModel::default()
        };

        assert_eq!(
            renderer.lines(&view),
            vec!["waiting for the server...", "[1/3] 33%"]
        );
        assert!(renderer.lines(&view).is_empty());

        view.progress = Some(Progress { done: 3, total: 3 });
        assert_eq!(renderer.lines(&view), vec!["[3/3] 100%"]);
    }

    #[test]
    fn completion_lists_every_job() {
        let mut renderer = ProgressRenderer::new();
        let view = SessionViewModel {
            phase: Phase::Complete,
            progress: Some(Progress { done: 2, total: 2 }),
            jobs: vec![
                row("a.jpg", JobStatus::Succeeded, None),
                row("b.jpg", JobStatus::Failed, Some("bad header")),
            ],
            ..SessionViewModel::default()
        };

        let lines = renderer.lines(&view);

        assert_eq!(
            lines[2..].to_vec(),
            vec!["  ok       a.jpg", "  failed   b.jpg: bad header"]
        );
    }

    #[test]
    fn empty_batch_counts_as_done() {
        assert_eq!(progress_line(&Progress { done: 0, total: 0 }), "[0/0] 100%");
    }

    #[test]
    fn delivery_mentions_skipped_jobs() {
        let summary = DeliverySummary {
            file_name: Some("converted_folder.zip".to_string()),
            entries: 2,
            skipped: 1,
        };
        assert_eq!(
            delivery_line(&summary, Some(Path::new("out/converted_folder.zip"))),
            "saved out/converted_folder.zip (2 files, 1 skipped)"
        );
    }
}
