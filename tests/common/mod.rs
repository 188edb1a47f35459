//! Shared fakes for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use cloudtorrent::config::settings::AppConfig;
use cloudtorrent::infrastructure::aria2::{DownloadView, RemoteDownloads};
use cloudtorrent::infrastructure::torrent::MagnetBook;
use cloudtorrent::modules::conversion::service::JobManager;
use cloudtorrent::state::AppState;
use cloudtorrent::ws::{Broadcaster, ConnectionRegistry};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const MAGNET: &str =
    "magnet:?xt=urn:btih:3B245504CF5F11BBDBE1201CEA6A6BF45AEE1BC0&dn=ubuntu-24.04.iso";
pub const MAGNET_ID: &str = "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0";

/// In-memory stand-in for the aria2 daemon.
pub struct FakeDownloads {
    available: bool,
    failing: bool,
    list_delay: Option<std::time::Duration>,
    added: Mutex<Vec<String>>,
}

impl FakeDownloads {
    pub fn available() -> Self {
        Self {
            available: true,
            failing: false,
            list_delay: None,
            added: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::available()
        }
    }

    /// Reachable at startup but every RPC call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::available()
        }
    }

    /// Every `list` call stalls for `delay` and then fails.
    pub fn slow(delay: std::time::Duration) -> Self {
        Self {
            failing: true,
            list_delay: Some(delay),
            ..Self::available()
        }
    }

    pub fn added(&self) -> Vec<String> {
        self.added.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if !self.available {
            bail!("aria2 not available");
        }
        if self.failing {
            bail!("aria2 request failed: connection refused");
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteDownloads for FakeDownloads {
    fn available(&self) -> bool {
        self.available
    }

    async fn add(&self, url: &str) -> Result<String> {
        self.check()?;
        let mut added = self.added.lock().unwrap();
        added.push(url.to_string());
        Ok(format!("gid{:04}", added.len()))
    }

    async fn list(&self) -> Result<Vec<DownloadView>> {
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        self.check()?;
        Ok(self
            .added
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(i, url)| DownloadView {
                gid: format!("gid{:04}", i + 1),
                name: url.rsplit('/').next().unwrap_or(url).to_string(),
                total_length: 0,
                completed_length: 0,
                download_speed: 0,
                status: "Queued".to_string(),
                progress: "0.0%".to_string(),
                progress_num: 0.0,
                speed: "0 B/s".to_string(),
            })
            .collect())
    }

    async fn pause(&self, gid: &str) -> Result<()> {
        self.check()?;
        self.known(gid)
    }

    async fn resume(&self, gid: &str) -> Result<()> {
        self.check()?;
        self.known(gid)
    }

    async fn remove(&self, gid: &str) -> Result<()> {
        self.check()?;
        self.known(gid)
    }
}

impl FakeDownloads {
    fn known(&self, gid: &str) -> Result<()> {
        let count = self.added.lock().unwrap().len();
        (1..=count)
            .map(|i| format!("gid{:04}", i))
            .any(|g| g == gid)
            .then_some(())
            .ok_or_else(|| anyhow!("aria2 error: GID {} is not found", gid))
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Router with no transcoder, a fresh torrent book and the given download
/// service. The broadcast delivery loop is running.
pub fn build_test_app(downloads: FakeDownloads) -> (Router, AppState) {
    let registry = Arc::new(ConnectionRegistry::new());
    let (broadcaster, queue) = Broadcaster::new(registry, 16);
    broadcaster.spawn_delivery(queue);

    let state = AppState::new(
        AppConfig::default(),
        Arc::new(JobManager::new(None)),
        Arc::new(MagnetBook::new()),
        Arc::new(downloads),
        broadcaster,
    );
    (cloudtorrent::app::create_app(state.clone()), state)
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
