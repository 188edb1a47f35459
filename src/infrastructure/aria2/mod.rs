use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

pub mod client;
pub mod daemon;
pub mod status;

pub use client::Aria2Client;

/// One remote download as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DownloadView {
    pub gid: String,
    pub name: String,
    pub total_length: i64,
    pub completed_length: i64,
    pub download_speed: i64,
    pub status: String,
    /// Formatted percentage, e.g. `12.5%`.
    pub progress: String,
    pub progress_num: f64,
    /// Human rate, e.g. `1.2 MB/s`.
    pub speed: String,
}

/// The download accelerator daemon. Availability is decided once at startup;
/// every call on an unavailable service fails.
#[async_trait]
pub trait RemoteDownloads: Send + Sync {
    fn available(&self) -> bool;
    async fn add(&self, url: &str) -> Result<String>;
    async fn list(&self) -> Result<Vec<DownloadView>>;
    async fn pause(&self, gid: &str) -> Result<()>;
    async fn resume(&self, gid: &str) -> Result<()>;
    async fn remove(&self, gid: &str) -> Result<()>;
}
