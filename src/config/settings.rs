use crate::config::env::{self, EnvKey};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ARIA2_RPC_URL: &str = "http://localhost:6800/jsonrpc";

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub download_root: PathBuf,
    pub ffmpeg_bin: Option<String>,
    pub ffprobe_bin: Option<String>,
    pub aria2_rpc_url: String,
    pub aria2_secret: Option<String>,
    pub aria2_autostart: bool,
    pub broadcast_interval_ms: u64,
    pub broadcast_queue_capacity: usize,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            download_root: PathBuf::from(env::get_or(EnvKey::DownloadRoot, "./downloads")),
            ffmpeg_bin: env::get_optional(EnvKey::FfmpegBin),
            ffprobe_bin: env::get_optional(EnvKey::FfprobeBin),
            aria2_rpc_url: env::get_or(EnvKey::Aria2RpcUrl, DEFAULT_ARIA2_RPC_URL),
            aria2_secret: env::get_optional(EnvKey::Aria2Secret),
            aria2_autostart: env::get_flag(EnvKey::Aria2Autostart, true),
            broadcast_interval_ms: env::get_parsed(EnvKey::BroadcastIntervalMs, 600),
            broadcast_queue_capacity: env::get_parsed(EnvKey::BroadcastQueueCapacity, 100),
        }
    }

    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms.max(1))
    }

    /// `tokio::sync::mpsc` panics on a zero capacity.
    pub fn queue_capacity(&self) -> usize {
        self.broadcast_queue_capacity.max(1)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 3000,
            download_root: PathBuf::from("./downloads"),
            ffmpeg_bin: None,
            ffprobe_bin: None,
            aria2_rpc_url: DEFAULT_ARIA2_RPC_URL.to_string(),
            aria2_secret: None,
            aria2_autostart: true,
            broadcast_interval_ms: 600,
            broadcast_queue_capacity: 100,
        }
    }
}
