use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

pub mod magnet;

pub use magnet::MagnetBook;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TorrentView {
    /// Lower-case info hash.
    pub id: String,
    pub name: String,
    pub magnet: String,
    pub status: String,
    #[serde(with = "time::serde::iso8601")]
    #[schema(value_type = String, format = DateTime)]
    pub added_at: OffsetDateTime,
}

/// The peer-to-peer engine as seen by the control surface.
///
/// The boolean results distinguish "nothing to do" (duplicate add, unknown
/// id) from transport failures.
#[async_trait]
pub trait TransferEngine: Send + Sync {
    async fn add(&self, link: &str) -> Result<bool>;
    async fn remove(&self, id: &str) -> Result<bool>;
    async fn pause(&self, id: &str) -> Result<bool>;
    async fn resume(&self, id: &str) -> Result<bool>;
    async fn list(&self) -> Vec<TorrentView>;
    async fn count(&self) -> usize;
}
