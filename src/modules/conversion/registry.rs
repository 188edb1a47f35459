use super::error::JobError;
use super::model::{ConversionJob, JobStatus};
use super::progress::ProgressSample;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

struct JobEntry {
    job: ConversionJob,
    cancel: CancellationToken,
}

/// Canonical store of conversion jobs.
///
/// Cheap to clone; all clones share one map behind a single `RwLock`. The
/// lock only ever guards map and record mutation, never process or network
/// I/O.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<String, JobEntry>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, job: ConversionJob, cancel: CancellationToken) {
        self.jobs
            .write()
            .await
            .insert(job.id.clone(), JobEntry { job, cancel });
    }

    pub async fn get(&self, id: &str) -> Option<ConversionJob> {
        self.jobs.read().await.get(id).map(|e| e.job.clone())
    }

    /// Oldest first.
    pub async fn list(&self) -> Vec<ConversionJob> {
        let mut jobs: Vec<ConversionJob> = self
            .jobs
            .read()
            .await
            .values()
            .map(|e| e.job.clone())
            .collect();
        jobs.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        jobs
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Marks a job cancelled and fires its token. Terminal jobs are left as
    /// they are, so repeated calls are harmless.
    pub async fn cancel(&self, id: &str) -> Result<ConversionJob, JobError> {
        let mut jobs = self.jobs.write().await;
        let entry = jobs
            .get_mut(id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))?;

        if entry.job.transition(JobStatus::Cancelled) {
            entry.cancel.cancel();
        }
        Ok(entry.job.clone())
    }

    /// Cancels a live job, then drops its record.
    pub async fn remove(&self, id: &str) -> Result<ConversionJob, JobError> {
        let mut jobs = self.jobs.write().await;
        let mut entry = jobs
            .remove(id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))?;

        if entry.job.transition(JobStatus::Cancelled) {
            entry.cancel.cancel();
        }
        Ok(entry.job)
    }

    pub fn handle(&self, id: &str, cancel: CancellationToken) -> JobHandle {
        JobHandle {
            id: id.to_string(),
            registry: self.clone(),
            cancel,
        }
    }

    /// Applies `f` to the record if it still exists.
    async fn update<R>(&self, id: &str, f: impl FnOnce(&mut ConversionJob) -> R) -> Option<R> {
        self.jobs.write().await.get_mut(id).map(|e| f(&mut e.job))
    }
}

/// What a running conversion task may do to its own record: start it, feed
/// progress, finish it. It never owns a copy of the job.
#[derive(Clone)]
pub struct JobHandle {
    id: String,
    registry: JobRegistry,
    cancel: CancellationToken,
}

impl JobHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// `Queued -> Running`. False when the job was cancelled or removed
    /// before the task got going.
    pub async fn begin(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.registry
            .update(&self.id, |job| job.transition(JobStatus::Running))
            .await
            .unwrap_or(false)
    }

    pub async fn record(&self, sample: &ProgressSample) {
        self.registry
            .update(&self.id, |job| job.apply_progress(sample))
            .await;
    }

    pub async fn complete(&self) -> bool {
        self.registry
            .update(&self.id, |job| job.complete())
            .await
            .unwrap_or(false)
    }

    pub async fn fail(&self, detail: String) -> bool {
        self.registry
            .update(&self.id, |job| job.fail(detail))
            .await
            .unwrap_or(false)
    }
}
