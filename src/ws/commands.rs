use std::sync::Arc;

use crate::infrastructure::aria2::RemoteDownloads;
use crate::infrastructure::torrent::TransferEngine;

use super::message::{Action, ClientCommand, CommandReply, WsMessage};

/// Decodes client frames and runs them against the collaborators.
#[derive(Clone)]
pub struct CommandDispatcher {
    torrents: Arc<dyn TransferEngine>,
    downloads: Arc<dyn RemoteDownloads>,
}

impl CommandDispatcher {
    pub fn new(torrents: Arc<dyn TransferEngine>, downloads: Arc<dyn RemoteDownloads>) -> Self {
        Self {
            torrents,
            downloads,
        }
    }

    /// Returns the `response` message for the originating connection, or
    /// `None` for frames that are not a known command.
    pub async fn dispatch(&self, frame: &str) -> Option<WsMessage> {
        let command: ClientCommand = match serde_json::from_str(frame) {
            Ok(cmd) => cmd,
            Err(e) => {
                tracing::debug!("Ignoring unparsable client frame: {}", e);
                return None;
            }
        };

        let Some(action) = Action::parse(&command.action) else {
            tracing::debug!(action = %command.action, "Ignoring unknown client action");
            return None;
        };

        let reply = self.run(action, command.data.trim()).await;
        Some(reply.into_message())
    }

    async fn run(&self, action: Action, data: &str) -> CommandReply {
        match action {
            Action::AddTorrent => match self.torrents.add(data).await {
                Ok(true) => CommandReply::ok_with("Torrent added"),
                Ok(false) => CommandReply::error("Torrent already exists"),
                Err(e) => CommandReply::error(e.to_string()),
            },
            Action::RemoveTorrent => found(self.torrents.remove(data).await),
            Action::PauseTorrent => found(self.torrents.pause(data).await),
            Action::ResumeTorrent => found(self.torrents.resume(data).await),
            Action::AddDownload => {
                if !self.downloads.available() {
                    return CommandReply::error("aria2 not available");
                }
                match self.downloads.add(data).await {
                    Ok(gid) => {
                        tracing::info!(gid = %gid, "Download added");
                        CommandReply::ok()
                    }
                    Err(e) => CommandReply::error(e.to_string()),
                }
            }
        }
    }
}

fn found(result: anyhow::Result<bool>) -> CommandReply {
    match result {
        Ok(true) => CommandReply::ok(),
        Ok(false) => CommandReply::error("Torrent not found"),
        Err(e) => CommandReply::error(e.to_string()),
    }
}
