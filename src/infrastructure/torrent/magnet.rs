use super::{TorrentView, TransferEngine};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::info;
use url::Url;

const STATUS_ACTIVE: &str = "Downloading";
const STATUS_PAUSED: &str = "Paused";

/// In-process torrent book: tracks magnet links and their run state without
/// speaking the peer wire protocol.
#[derive(Default)]
pub struct MagnetBook {
    torrents: RwLock<HashMap<String, TorrentView>>,
}

impl MagnetBook {
    pub fn new() -> Self {
        Self::default()
    }

    async fn set_status(&self, id: &str, status: &str) -> bool {
        match self.torrents.write().await.get_mut(&id.to_ascii_lowercase()) {
            Some(t) => {
                t.status = status.to_string();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl TransferEngine for MagnetBook {
    async fn add(&self, link: &str) -> Result<bool> {
        let (id, name) = parse_magnet(link)?;
        let mut torrents = self.torrents.write().await;
        if torrents.contains_key(&id) {
            return Ok(false);
        }
        info!(torrent = %id, name = %name, "Torrent added");
        torrents.insert(
            id.clone(),
            TorrentView {
                id,
                name,
                magnet: link.trim().to_string(),
                status: STATUS_ACTIVE.to_string(),
                added_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(true)
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self
            .torrents
            .write()
            .await
            .remove(&id.to_ascii_lowercase())
            .is_some())
    }

    async fn pause(&self, id: &str) -> Result<bool> {
        Ok(self.set_status(id, STATUS_PAUSED).await)
    }

    async fn resume(&self, id: &str) -> Result<bool> {
        Ok(self.set_status(id, STATUS_ACTIVE).await)
    }

    async fn list(&self) -> Vec<TorrentView> {
        let mut list: Vec<TorrentView> = self.torrents.read().await.values().cloned().collect();
        list.sort_by(|a, b| a.added_at.cmp(&b.added_at).then_with(|| a.id.cmp(&b.id)));
        list
    }

    async fn count(&self) -> usize {
        self.torrents.read().await.len()
    }
}

/// Extracts `(info hash, display name)` from a magnet URI.
fn parse_magnet(link: &str) -> Result<(String, String)> {
    let url = Url::parse(link.trim()).map_err(|e| anyhow!("Invalid magnet link: {}", e))?;
    if url.scheme() != "magnet" {
        return Err(anyhow!("Unsupported link: only magnet URIs are accepted"));
    }

    let mut hash = None;
    let mut name = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "xt" => {
                if let Some(h) = value.strip_prefix("urn:btih:") {
                    hash = Some(h.to_ascii_lowercase());
                }
            }
            "dn" => name = Some(value.to_string()),
            _ => {}
        }
    }

    let hash = hash
        .filter(|h| !h.is_empty())
        .ok_or_else(|| anyhow!("Invalid magnet link: missing btih info hash"))?;
    let name = name.unwrap_or_else(|| hash.clone());
    Ok((hash, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const UBUNTU: &str = "magnet:?xt=urn:btih:3B245504CF5F11BBDBE1201CEA6A6BF45AEE1BC0&dn=ubuntu-24.04.iso&tr=udp%3A%2F%2Ftracker.example%3A1337";

    #[test]
    fn magnet_yields_hash_and_name() {
        let (hash, name) = parse_magnet(UBUNTU).unwrap();
        assert_eq!(hash, "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0");
        assert_eq!(name, "ubuntu-24.04.iso");
    }

    #[test]
    fn non_magnet_links_are_rejected() {
        assert!(parse_magnet("https://example.com/a.torrent").is_err());
        assert!(parse_magnet("magnet:?dn=nohash").is_err());
        assert!(parse_magnet("not a url").is_err());
    }

    #[tokio::test]
    async fn duplicate_add_reports_false() {
        let book = MagnetBook::new();
        assert!(book.add(UBUNTU).await.unwrap());
        assert!(!book.add(UBUNTU).await.unwrap());
        assert_eq!(book.count().await, 1);
    }

    #[tokio::test]
    async fn pause_resume_remove_by_id() {
        let book = MagnetBook::new();
        book.add(UBUNTU).await.unwrap();
        let id = "3B245504CF5F11BBDBE1201CEA6A6BF45AEE1BC0";

        assert!(book.pause(id).await.unwrap());
        assert_eq!(book.list().await[0].status, "Paused");
        assert!(book.resume(id).await.unwrap());
        assert_eq!(book.list().await[0].status, "Downloading");

        assert!(book.remove(id).await.unwrap());
        assert!(!book.remove(id).await.unwrap());
        assert!(!book.pause(id).await.unwrap());
        assert_eq!(book.count().await, 0);
    }
}
