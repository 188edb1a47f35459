use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    DownloadRoot,
    FfmpegBin,
    FfprobeBin,
    Aria2RpcUrl,
    Aria2Secret,
    Aria2Autostart,
    BroadcastIntervalMs,
    BroadcastQueueCapacity,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::DownloadRoot => "DOWNLOAD_ROOT",
            EnvKey::FfmpegBin => "FFMPEG_BIN",
            EnvKey::FfprobeBin => "FFPROBE_BIN",
            EnvKey::Aria2RpcUrl => "ARIA2_RPC_URL",
            EnvKey::Aria2Secret => "ARIA2_SECRET",
            EnvKey::Aria2Autostart => "ARIA2_AUTOSTART",
            EnvKey::BroadcastIntervalMs => "BROADCAST_INTERVAL_MS",
            EnvKey::BroadcastQueueCapacity => "BROADCAST_QUEUE_CAPACITY",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

/// Unset and blank values both read as `None`.
pub fn get_optional(key: EnvKey) -> Option<String> {
    get(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

pub fn get_flag(key: EnvKey, default: bool) -> bool {
    get(key)
        .ok()
        .and_then(|val| parse_flag(&val))
        .unwrap_or(default)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
