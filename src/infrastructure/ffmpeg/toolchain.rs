use crate::modules::conversion::error::JobError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::warn;

/// An external binary plus any arguments that must precede the caller's,
/// e.g. `nice -n 10 ffmpeg` is program `nice` with `-n 10 ffmpeg` leading.
#[derive(Debug, Clone)]
pub struct Tool {
    pub program: PathBuf,
    pub leading_args: Vec<OsString>,
}

impl Tool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Whitespace-separated override such as `FFMPEG_BIN="nice -n 10 ffmpeg"`.
    pub fn from_spec(spec: &str) -> Option<Self> {
        let mut parts = spec.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program).with_leading_args(parts))
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args);
        cmd
    }
}

/// The transcoder and its companion probe. Conversions are only enabled
/// when both resolve.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub ffmpeg: Tool,
    pub ffprobe: Tool,
}

impl Toolchain {
    pub fn new(ffmpeg: Tool, ffprobe: Tool) -> Self {
        Self { ffmpeg, ffprobe }
    }

    /// Resolves both tools from explicit overrides or `PATH`.
    pub fn detect(ffmpeg_override: Option<&str>, ffprobe_override: Option<&str>) -> Option<Self> {
        let ffmpeg = resolve("ffmpeg", ffmpeg_override)?;
        let ffprobe = resolve("ffprobe", ffprobe_override)?;
        Some(Self { ffmpeg, ffprobe })
    }

    /// Media duration in seconds as reported by the container.
    pub async fn probe_duration(&self, input: &Path) -> Result<f64, JobError> {
        let output = self
            .ffprobe
            .command()
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(input)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| JobError::SpawnFailure(e.to_string()))?;

        if !output.status.success() {
            return Err(JobError::RuntimeFailure(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_duration(&stdout)
            .ok_or_else(|| JobError::RuntimeFailure(format!("unexpected ffprobe output: {}", stdout.trim())))
    }
}

/// An override must name an existing executable, either a path or a
/// program on `PATH`.
fn resolve(name: &str, override_spec: Option<&str>) -> Option<Tool> {
    if let Some(spec) = override_spec {
        let tool = Tool::from_spec(spec)?;
        return match which::which(&tool.program) {
            Ok(program) => Some(Tool { program, ..tool }),
            Err(_) => {
                warn!(
                    "{} override {:?} not found - conversion features disabled",
                    name, spec
                );
                None
            }
        };
    }
    match which::which(name) {
        Ok(path) => Some(Tool::new(path)),
        Err(_) => {
            warn!("{} not found in PATH - conversion features disabled", name);
            None
        }
    }
}

fn parse_duration(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())?
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}
