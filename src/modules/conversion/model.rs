use super::progress::ProgressSample;
use serde::{Deserialize, Serialize};
use std::path::Path;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Lifecycle of a conversion job.
///
/// `Queued -> Running -> {Completed, Failed, Cancelled}`, with `Cancelled`
/// also reachable straight from `Queued`. Terminal states have no exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    #[serde(rename = "converting")]
    Running,
    Completed,
    #[serde(rename = "error")]
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Queued, Running) | (Queued, Cancelled) | (Running, Completed) | (Running, Failed) | (Running, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversionJob {
    pub id: String,
    pub input_path: String,
    pub output_path: String,
    pub input_name: String,
    pub output_name: String,
    pub format: String,
    pub status: JobStatus,
    pub progress: f64,
    /// Total media duration in seconds, `0` when the probe failed.
    pub duration: f64,
    /// Elapsed media time in seconds.
    pub current_time: f64,
    pub speed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(with = "time::serde::iso8601")]
    #[schema(value_type = String, format = DateTime)]
    pub start_time: OffsetDateTime,
}

impl ConversionJob {
    pub fn queued(id: String, input: &Path, output: &Path, format: &str, duration: f64) -> Self {
        Self {
            id,
            input_path: input.to_string_lossy().to_string(),
            output_path: output.to_string_lossy().to_string(),
            input_name: file_name(input),
            output_name: file_name(output),
            format: format.to_string(),
            status: JobStatus::Queued,
            progress: 0.0,
            duration,
            current_time: 0.0,
            speed: String::new(),
            error: None,
            start_time: OffsetDateTime::now_utc(),
        }
    }

    /// Moves to `next` when the state machine allows it. Returns whether the
    /// status changed.
    pub fn transition(&mut self, next: JobStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        true
    }

    pub fn complete(&mut self) -> bool {
        let moved = self.transition(JobStatus::Completed);
        if moved {
            self.progress = 100.0;
        }
        moved
    }

    pub fn fail(&mut self, detail: String) -> bool {
        let moved = self.transition(JobStatus::Failed);
        if moved {
            self.error = Some(detail);
        }
        moved
    }

    /// Folds one parsed progress line into the record. Ignored unless the
    /// job is running; progress never decreases and never leaves [0, 100].
    pub fn apply_progress(&mut self, sample: &ProgressSample) {
        if self.status != JobStatus::Running {
            return;
        }

        if let Some(elapsed) = sample.elapsed_secs {
            self.current_time = elapsed;
            if self.duration > 0.0 {
                let pct = (elapsed / self.duration * 100.0).clamp(0.0, 100.0);
                if pct > self.progress {
                    self.progress = pct;
                }
            }
        }

        if let Some(speed) = &sample.speed {
            self.speed = speed.clone();
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn job(duration: f64) -> ConversionJob {
        ConversionJob::queued(
            "conv_1_1".to_string(),
            &PathBuf::from("/media/clip.mkv"),
            &PathBuf::from("/media/clip_converted.mp4"),
            "mp4",
            duration,
        )
    }

    fn at(secs: f64) -> ProgressSample {
        ProgressSample {
            elapsed_secs: Some(secs),
            speed: None,
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for terminal in [JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled] {
            for next in [
                JobStatus::Queued,
                JobStatus::Running,
                JobStatus::Completed,
                JobStatus::Failed,
                JobStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(next), "{terminal:?} -> {next:?}");
            }
        }
    }

    #[test]
    fn queued_job_cannot_complete_without_running() {
        let mut job = job(10.0);
        assert!(!job.complete());
        assert_eq!(job.status, JobStatus::Queued);
        assert!(job.transition(JobStatus::Cancelled));
    }

    #[test]
    fn progress_tracks_elapsed_over_duration() {
        let mut job = job(120.0);
        job.transition(JobStatus::Running);

        job.apply_progress(&at(60.0));

        assert_eq!(job.progress, 50.0);
        assert_eq!(job.current_time, 60.0);
    }

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let mut job = job(120.0);
        job.transition(JobStatus::Running);

        job.apply_progress(&at(90.0));
        job.apply_progress(&at(30.0));
        assert_eq!(job.progress, 75.0);

        job.apply_progress(&at(500.0));
        assert_eq!(job.progress, 100.0);
    }

    #[test]
    fn unknown_duration_leaves_progress_untouched() {
        let mut job = job(0.0);
        job.transition(JobStatus::Running);

        job.apply_progress(&at(42.0));

        assert_eq!(job.progress, 0.0);
        assert_eq!(job.current_time, 42.0);
    }

    #[test]
    fn samples_outside_running_are_ignored() {
        let mut job = job(100.0);
        job.apply_progress(&at(50.0));
        assert_eq!(job.progress, 0.0);

        job.transition(JobStatus::Running);
        job.transition(JobStatus::Cancelled);
        job.apply_progress(&at(50.0));
        assert_eq!(job.progress, 0.0);
    }

    #[test]
    fn completion_forces_full_progress() {
        let mut job = job(0.0);
        job.transition(JobStatus::Running);
        assert!(job.complete());
        assert_eq!(job.progress, 100.0);
        assert!(!job.fail("late".to_string()));
        assert!(job.error.is_none());
    }

    #[test]
    fn wire_status_names() {
        let mut job = job(1.0);
        job.transition(JobStatus::Running);
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["status"], "converting");
        assert_eq!(value["input_name"], "clip.mkv");
        assert!(value.get("error").is_none());
        assert_eq!(serde_json::to_value(JobStatus::Failed).unwrap(), "error");
    }
}
