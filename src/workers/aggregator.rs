use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::infrastructure::aria2::RemoteDownloads;
use crate::infrastructure::torrent::TransferEngine;
use crate::modules::conversion::service::JobManager;
use crate::ws::{Broadcaster, MessageKind, WsMessage};

/// Upper bound on one `aria2` list pull.
pub const DOWNLOADS_PULL_TIMEOUT: Duration = Duration::from_secs(2);

/// Assembles the periodic status snapshot from the job manager and the
/// external collaborators. Holds no connection state.
#[derive(Clone)]
pub struct StateAggregator {
    jobs: Arc<JobManager>,
    torrents: Arc<dyn TransferEngine>,
    downloads: Arc<dyn RemoteDownloads>,
}

impl StateAggregator {
    pub fn new(
        jobs: Arc<JobManager>,
        torrents: Arc<dyn TransferEngine>,
        downloads: Arc<dyn RemoteDownloads>,
    ) -> Self {
        Self {
            jobs,
            torrents,
            downloads,
        }
    }

    /// The in-process slices: torrents and conversion jobs. Never waits on
    /// the download daemon.
    pub async fn local_slices(&self) -> Vec<WsMessage> {
        let mut slices = Vec::with_capacity(2);
        push_slice(&mut slices, MessageKind::Torrents, &self.torrents.list().await);
        push_slice(&mut slices, MessageKind::Ffmpeg, &self.jobs.list().await);
        slices
    }

    /// The `aria2` slice, or `None` when the daemon is unavailable, failing
    /// or slower than `DOWNLOADS_PULL_TIMEOUT`.
    pub async fn downloads_slice(&self) -> Option<WsMessage> {
        if !self.downloads.available() {
            return None;
        }
        match timeout(DOWNLOADS_PULL_TIMEOUT, self.downloads.list()).await {
            Ok(Ok(list)) => {
                let mut slices = Vec::with_capacity(1);
                push_slice(&mut slices, MessageKind::Aria2, &list);
                slices.pop()
            }
            Ok(Err(e)) => {
                tracing::debug!("aria2 slice skipped: {}", e);
                None
            }
            Err(_) => {
                tracing::debug!("aria2 slice skipped: list timed out");
                None
            }
        }
    }

    /// Initial state for a newly connected client: the local slices plus both
    /// capability flags. The `aria2` slice is pulled separately so a slow
    /// daemon cannot hold the connection back.
    pub async fn bootstrap(&self) -> Vec<WsMessage> {
        let mut messages = self.local_slices().await;
        messages.push(WsMessage::availability(
            MessageKind::Aria2Status,
            self.downloads.available(),
        ));
        messages.push(WsMessage::availability(
            MessageKind::FfmpegStatus,
            self.jobs.is_available(),
        ));
        messages
    }

    /// Publishes the local slices every `period` until the delivery loop goes
    /// away. The `aria2` slice is pulled in its own task and published when
    /// ready; a tick skips the pull while the previous one is still running.
    /// A full broadcast queue slows the ticks down instead of dropping them.
    pub fn spawn(self, broadcaster: Broadcaster, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(period_ms = period.as_millis() as u64, "🚀 State aggregator started");
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut pull: Option<JoinHandle<()>> = None;

            loop {
                ticker.tick().await;

                if self.downloads.available() && pull.as_ref().is_none_or(|p| p.is_finished()) {
                    let aggregator = self.clone();
                    let broadcaster = broadcaster.clone();
                    pull = Some(tokio::spawn(async move {
                        if let Some(slice) = aggregator.downloads_slice().await {
                            broadcaster.publish(slice).await;
                        }
                    }));
                }

                for message in self.local_slices().await {
                    if !broadcaster.publish(message).await {
                        tracing::info!("Broadcast queue closed, stopping aggregator");
                        if let Some(pull) = pull {
                            pull.abort();
                        }
                        return;
                    }
                }
            }
        })
    }
}

fn push_slice<T: serde::Serialize>(slices: &mut Vec<WsMessage>, kind: MessageKind, data: &T) {
    match serde_json::to_value(data) {
        Ok(value) => slices.push(WsMessage::new(kind, value)),
        Err(e) => tracing::error!(kind = ?kind, "Failed to serialize slice: {}", e),
    }
}
