use std::ffi::OsString;
use std::path::{Path, PathBuf};

const MP4: &[&str] = &[
    "-c:v", "libx264", "-preset", "medium", "-crf", "23",
    "-c:a", "aac", "-b:a", "128k",
    "-movflags", "+faststart",
];

const WEBM: &[&str] = &[
    "-c:v", "libvpx-vp9", "-crf", "30", "-b:v", "0",
    "-c:a", "libopus", "-b:a", "128k",
];

const MKV: &[&str] = &[
    "-c:v", "libx264", "-preset", "medium", "-crf", "23",
    "-c:a", "copy",
];

const FALLBACK: &[&str] = &[
    "-c:v", "libx264", "-preset", "medium", "-crf", "23",
    "-c:a", "aac", "-b:a", "128k",
];

/// Codec and container flags for a format tag. Unknown tags get the H.264/AAC
/// fallback instead of an error.
pub fn codec_args(format: &str) -> &'static [&'static str] {
    match format.to_ascii_lowercase().as_str() {
        "mp4" => MP4,
        "webm" => WEBM,
        "mkv" => MKV,
        _ => FALLBACK,
    }
}

/// Full transcoder argument list: input, progress reporting on stdout,
/// the codec profile, then the output path.
pub fn build_args(input: &Path, output: &Path, format: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), input.into()];
    args.extend(
        ["-y", "-progress", "pipe:1", "-stats_period", "0.5"]
            .iter()
            .map(OsString::from),
    );
    args.extend(codec_args(format).iter().map(OsString::from));
    args.push(output.into());
    args
}

/// `<dir>/<stem>_converted.<format>` next to the input.
pub fn output_path_for(input: &Path, format: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let name = format!("{}_converted.{}", stem, format);
    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}
