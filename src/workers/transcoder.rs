use crate::infrastructure::ffmpeg::Toolchain;
use crate::modules::conversion::error::JobError;
use crate::modules::conversion::profile;
use crate::modules::conversion::progress::ProgressParser;
use crate::modules::conversion::registry::JobHandle;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Lines of stderr kept for the failure report.
const DIAGNOSTIC_TAIL: usize = 20;

/// Everything one conversion task needs. The task reaches its job record only
/// through `handle`.
pub struct ConversionTask {
    pub toolchain: Toolchain,
    pub parser: Arc<dyn ProgressParser>,
    pub handle: JobHandle,
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: String,
}

pub fn spawn_conversion(task: ConversionTask) -> JoinHandle<()> {
    tokio::spawn(run_conversion(task))
}

pub async fn run_conversion(task: ConversionTask) {
    let ConversionTask {
        toolchain,
        parser,
        handle,
        input,
        output,
        format,
    } = task;
    let job_id = handle.id().to_string();

    if !handle.begin().await {
        info!(job_id = %job_id, "Conversion cancelled before start");
        return;
    }

    info!(job_id = %job_id, input = %input.display(), format = %format, "🎥 Starting conversion");

    let mut child = match toolchain
        .ffmpeg
        .command()
        .args(profile::build_args(&input, &output, &format))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            let err = JobError::SpawnFailure(e.to_string());
            error!(job_id = %job_id, "❌ {}", err);
            handle.fail(err.to_string()).await;
            return;
        }
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        terminate(&mut child, &job_id).await;
        let err = JobError::SpawnFailure("transcoder output pipes unavailable".to_string());
        error!(job_id = %job_id, "❌ {}", err);
        handle.fail(err.to_string()).await;
        return;
    };

    // stderr is drained for the whole run or ffmpeg blocks on a full pipe.
    let diagnostics = tokio::spawn(drain_diagnostics(stderr));

    let mut lines = BufReader::new(stdout).lines();
    let mut stream_fault = None;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if handle.is_cancelled() {
                    terminate(&mut child, &job_id).await;
                    diagnostics.abort();
                    info!(job_id = %job_id, "Conversion cancelled");
                    return;
                }
                if let Some(sample) = parser.parse_line(&line) {
                    handle.record(&sample).await;
                }
            }
            Ok(None) => break,
            Err(e) => {
                stream_fault = Some(e.to_string());
                terminate(&mut child, &job_id).await;
                break;
            }
        }
    }

    let status = child.wait().await;
    let diagnostic = diagnostics.await.unwrap_or_default();

    if handle.is_cancelled() {
        info!(job_id = %job_id, "Conversion cancelled");
        return;
    }

    if let Some(fault) = stream_fault {
        let err = JobError::RuntimeFailure(format!("progress stream error: {}", fault));
        warn!(job_id = %job_id, "❌ {}", err);
        handle.fail(fault).await;
        return;
    }

    match status {
        Ok(status) if status.success() => {
            handle.complete().await;
            info!(job_id = %job_id, "✅ Conversion completed");
        }
        Ok(status) => {
            let detail = if diagnostic.is_empty() {
                format!("ffmpeg exited with {}", status)
            } else {
                diagnostic
            };
            warn!(job_id = %job_id, "❌ {}", JobError::RuntimeFailure(detail.clone()));
            handle.fail(detail).await;
        }
        Err(e) => {
            warn!(job_id = %job_id, "❌ Failed to wait on transcoder: {}", e);
            handle.fail(e.to_string()).await;
        }
    }
}

async fn terminate(child: &mut Child, job_id: &str) {
    if let Err(e) = child.kill().await {
        debug!(job_id = %job_id, "Transcoder already gone: {}", e);
    }
}

/// Reads the stream to EOF, returning its last few lines.
async fn drain_diagnostics<R>(stream: R) -> String
where
    R: AsyncRead + Unpin,
{
    let mut tail = VecDeque::with_capacity(DIAGNOSTIC_TAIL);
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        if tail.len() == DIAGNOSTIC_TAIL {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    Vec::from(tail).join("\n")
}
