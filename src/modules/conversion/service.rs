use super::error::JobError;
use super::model::ConversionJob;
use super::profile;
use super::progress::{FfmpegProgressParser, ProgressParser};
use super::registry::JobRegistry;
use crate::infrastructure::ffmpeg::Toolchain;
use crate::workers::transcoder::{self, ConversionTask};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Submits, tracks and stops conversion jobs.
pub struct JobManager {
    registry: JobRegistry,
    toolchain: Option<Toolchain>,
    parser: Arc<dyn ProgressParser>,
    counter: AtomicU64,
}

impl JobManager {
    pub fn new(toolchain: Option<Toolchain>) -> Self {
        Self::with_parser(toolchain, Arc::new(FfmpegProgressParser))
    }

    pub fn with_parser(toolchain: Option<Toolchain>, parser: Arc<dyn ProgressParser>) -> Self {
        Self {
            registry: JobRegistry::new(),
            toolchain,
            parser,
            counter: AtomicU64::new(0),
        }
    }

    pub fn is_available(&self) -> bool {
        self.toolchain.is_some()
    }

    /// Validates and registers a job, then starts its conversion task. The
    /// record is visible to `get`/`list` before the task exists.
    pub async fn submit(&self, input: &Path, format: &str) -> Result<ConversionJob, JobError> {
        let toolchain = self.toolchain.clone().ok_or(JobError::ToolUnavailable)?;

        if !tokio::fs::try_exists(input).await.unwrap_or(false) {
            return Err(JobError::InputNotFound(input.display().to_string()));
        }

        let duration = match toolchain.probe_duration(input).await {
            Ok(d) => d,
            Err(e) => {
                warn!("Could not get video duration for {}: {}", input.display(), e);
                0.0
            }
        };

        let output = profile::output_path_for(input, format);
        let job = ConversionJob::queued(self.next_id(), input, &output, format, duration);
        let cancel = CancellationToken::new();
        self.registry.insert(job.clone(), cancel.clone()).await;
        info!(job_id = %job.id, input = %job.input_name, format = %format, "📦 Conversion queued");

        transcoder::spawn_conversion(ConversionTask {
            toolchain,
            parser: self.parser.clone(),
            handle: self.registry.handle(&job.id, cancel),
            input: input.to_path_buf(),
            output,
            format: format.to_string(),
        });

        Ok(job)
    }

    pub async fn list(&self) -> Vec<ConversionJob> {
        self.registry.list().await
    }

    pub async fn get(&self, id: &str) -> Result<ConversionJob, JobError> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    /// Idempotent; the record reads `cancelled` immediately even though the
    /// process stops only when its task next observes the signal.
    pub async fn cancel(&self, id: &str) -> Result<ConversionJob, JobError> {
        let job = self.registry.cancel(id).await?;
        info!(job_id = %id, status = ?job.status, "Conversion cancel requested");
        Ok(job)
    }

    pub async fn remove(&self, id: &str) -> Result<(), JobError> {
        self.registry.remove(id).await?;
        info!(job_id = %id, "Conversion removed");
        Ok(())
    }

    /// `conv_<unix seconds>_<counter>`; the counter keeps same-second ids apart.
    fn next_id(&self) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("conv_{}_{}", OffsetDateTime::now_utc().unix_timestamp(), seq)
    }
}

/// Maps a client-supplied path onto the filesystem. Absolute paths are used
/// as given, except the `/dir/...` browse prefix which is rooted like
/// relative paths.
pub fn resolve_input_path(root: &Path, raw: &str) -> PathBuf {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix("/dir/") {
        return root.join(rest.trim_start_matches('/'));
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
