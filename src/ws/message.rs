use axum::extract::ws::Utf8Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Server to client message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Torrents,
    Aria2,
    Ffmpeg,
    Aria2Status,
    FfmpegStatus,
    Response,
    TorrentAdded,
    TorrentRemoved,
}

/// The `{type, data}` envelope shared by every server message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub data: Value,
}

impl WsMessage {
    pub fn new(kind: MessageKind, data: Value) -> Self {
        Self { kind, data }
    }

    /// Capability flag message, e.g. `{"type":"aria2_status","data":{"available":true}}`.
    pub fn availability(kind: MessageKind, available: bool) -> Self {
        Self::new(kind, json!({ "available": available }))
    }

    pub fn to_text(&self) -> Result<Utf8Bytes, serde_json::Error> {
        serde_json::to_string(self).map(Utf8Bytes::from)
    }
}

/// Client to server command envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientCommand {
    pub action: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddTorrent,
    RemoveTorrent,
    PauseTorrent,
    ResumeTorrent,
    AddDownload,
}

impl Action {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "add_torrent" => Some(Self::AddTorrent),
            "remove_torrent" => Some(Self::RemoveTorrent),
            "pause_torrent" => Some(Self::PauseTorrent),
            "resume_torrent" => Some(Self::ResumeTorrent),
            "add_download" => Some(Self::AddDownload),
            _ => None,
        }
    }
}

/// Payload of a `response` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandReply {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandReply {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: None,
        }
    }

    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn into_message(self) -> WsMessage {
        WsMessage::new(
            MessageKind::Response,
            serde_json::to_value(self).unwrap_or(Value::Null),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_snake_case_type() {
        let msg = WsMessage::availability(MessageKind::FfmpegStatus, true);
        assert_eq!(
            msg.to_text().unwrap().as_str(),
            r#"{"type":"ffmpeg_status","data":{"available":true}}"#
        );
    }

    #[test]
    fn command_without_data_defaults_to_empty() {
        let cmd: ClientCommand = serde_json::from_str(r#"{"action":"add_torrent"}"#).unwrap();
        assert_eq!(cmd.data, "");
        assert_eq!(Action::parse(&cmd.action), Some(Action::AddTorrent));
        assert_eq!(Action::parse("reboot"), None);
    }

    #[test]
    fn ok_reply_omits_message() {
        let msg = CommandReply::ok().into_message();
        assert_eq!(msg.data, json!({ "status": "ok" }));
    }
}
