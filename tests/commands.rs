//! Client command dispatch against the in-process torrent book and a fake
//! download service.

mod common;

use std::sync::Arc;

use cloudtorrent::infrastructure::torrent::{MagnetBook, TransferEngine};
use cloudtorrent::ws::{CommandDispatcher, MessageKind};
use common::{FakeDownloads, MAGNET, MAGNET_ID};
use serde_json::{json, Value};

fn dispatcher(downloads: FakeDownloads) -> (CommandDispatcher, Arc<MagnetBook>, Arc<FakeDownloads>) {
    let book = Arc::new(MagnetBook::new());
    let downloads = Arc::new(downloads);
    (
        CommandDispatcher::new(book.clone(), downloads.clone()),
        book,
        downloads,
    )
}

fn frame(action: &str, data: &str) -> String {
    json!({ "action": action, "data": data }).to_string()
}

async fn reply(dispatcher: &CommandDispatcher, action: &str, data: &str) -> Value {
    let msg = dispatcher
        .dispatch(&frame(action, data))
        .await
        .expect("expected a response");
    assert_eq!(msg.kind, MessageKind::Response);
    msg.data
}

#[tokio::test]
async fn add_torrent_acknowledges_and_rejects_duplicates() {
    let (dispatcher, book, _) = dispatcher(FakeDownloads::unavailable());

    assert_eq!(
        reply(&dispatcher, "add_torrent", MAGNET).await,
        json!({ "status": "ok", "message": "Torrent added" })
    );
    assert_eq!(
        reply(&dispatcher, "add_torrent", MAGNET).await,
        json!({ "status": "error", "message": "Torrent already exists" })
    );
    assert_eq!(book.count().await, 1);
}

#[tokio::test]
async fn invalid_magnet_reports_error() {
    let (dispatcher, _, _) = dispatcher(FakeDownloads::unavailable());

    let data = reply(&dispatcher, "add_torrent", "https://example.com/file.torrent").await;

    assert_eq!(data["status"], "error");
    assert!(data["message"].as_str().unwrap().contains("magnet"));
}

#[tokio::test]
async fn pause_resume_remove_by_id() {
    let (dispatcher, book, _) = dispatcher(FakeDownloads::unavailable());
    book.add(MAGNET).await.unwrap();

    assert_eq!(reply(&dispatcher, "pause_torrent", MAGNET_ID).await, json!({ "status": "ok" }));
    assert_eq!(book.list().await[0].status, "Paused");
    assert_eq!(reply(&dispatcher, "resume_torrent", MAGNET_ID).await, json!({ "status": "ok" }));
    assert_eq!(reply(&dispatcher, "remove_torrent", MAGNET_ID).await, json!({ "status": "ok" }));

    assert_eq!(
        reply(&dispatcher, "remove_torrent", MAGNET_ID).await,
        json!({ "status": "error", "message": "Torrent not found" })
    );
}

#[tokio::test]
async fn add_download_requires_the_service() {
    let (dispatcher, _, _) = dispatcher(FakeDownloads::unavailable());

    assert_eq!(
        reply(&dispatcher, "add_download", "https://example.com/debian.iso").await,
        json!({ "status": "error", "message": "aria2 not available" })
    );
}

#[tokio::test]
async fn add_download_forwards_trimmed_url() {
    let (dispatcher, _, downloads) = dispatcher(FakeDownloads::available());

    let data = reply(&dispatcher, "add_download", "  https://example.com/debian.iso ").await;

    assert_eq!(data, json!({ "status": "ok" }));
    assert_eq!(downloads.added(), vec!["https://example.com/debian.iso".to_string()]);
}

#[tokio::test]
async fn unknown_actions_and_garbage_get_no_response() {
    let (dispatcher, _, _) = dispatcher(FakeDownloads::available());

    assert!(dispatcher.dispatch(&frame("reboot", "now")).await.is_none());
    assert!(dispatcher.dispatch("not json at all").await.is_none());
    assert!(dispatcher.dispatch(r#"{"data":"missing action"}"#).await.is_none());
}
