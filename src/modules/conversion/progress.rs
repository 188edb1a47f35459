//! Line parser for the transcoder's `-progress` stream.
//!
//! The orchestration in `workers::transcoder` only sees [`ProgressParser`];
//! the ffmpeg grammar lives entirely in [`FfmpegProgressParser`].

/// One record extracted from a single progress line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSample {
    /// Elapsed media time, normalized to seconds.
    pub elapsed_secs: Option<f64>,
    /// Throughput label as reported, e.g. `1.52x`.
    pub speed: Option<String>,
}

pub trait ProgressParser: Send + Sync {
    /// Returns `None` for lines that carry neither field.
    fn parse_line(&self, line: &str) -> Option<ProgressSample>;
}

/// Parses `key=value` lines emitted by `ffmpeg -progress pipe:1`.
///
/// `out_time_us` and `out_time_ms` both carry microseconds. `out_time` is a
/// clock string and only consulted when it is the sole time key on a line.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegProgressParser;

impl ProgressParser for FfmpegProgressParser {
    fn parse_line(&self, line: &str) -> Option<ProgressSample> {
        let mut sample = ProgressSample::default();
        let mut clock = None;

        for (key, value) in line.split_whitespace().filter_map(|t| t.split_once('=')) {
            match key {
                "out_time_us" | "out_time_ms" => {
                    if let Some(secs) = parse_micros(value) {
                        sample.elapsed_secs = Some(secs);
                    }
                }
                "out_time" => clock = parse_clock(value),
                "speed" if !value.is_empty() => sample.speed = Some(value.to_string()),
                _ => {}
            }
        }

        if sample.elapsed_secs.is_none() {
            sample.elapsed_secs = clock;
        }

        if sample.elapsed_secs.is_none() && sample.speed.is_none() {
            return None;
        }
        Some(sample)
    }
}

fn parse_micros(raw: &str) -> Option<f64> {
    let micros: i64 = raw.trim().parse().ok()?;
    // ffmpeg reports negative offsets before the first packet is muxed
    (micros >= 0).then(|| micros as f64 / 1_000_000.0)
}

/// `HH:MM:SS[.fraction]` to seconds.
fn parse_clock(raw: &str) -> Option<f64> {
    let mut parts = raw.trim().splitn(3, ':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if hours < 0.0 || minutes < 0.0 || seconds < 0.0 {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}
