//! Snapshot assembly with healthy, missing and failing collaborators.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::Message;
use cloudtorrent::infrastructure::aria2::RemoteDownloads;
use cloudtorrent::infrastructure::torrent::{MagnetBook, TransferEngine};
use cloudtorrent::modules::conversion::service::JobManager;
use cloudtorrent::workers::aggregator::StateAggregator;
use cloudtorrent::ws::{Broadcaster, ConnectionRegistry, MessageKind, WsMessage};
use common::{FakeDownloads, MAGNET};
use serde_json::json;

fn aggregator(downloads: FakeDownloads) -> (StateAggregator, Arc<MagnetBook>, Arc<FakeDownloads>) {
    let book = Arc::new(MagnetBook::new());
    let downloads = Arc::new(downloads);
    let aggregator = StateAggregator::new(
        Arc::new(JobManager::new(None)),
        book.clone(),
        downloads.clone(),
    );
    (aggregator, book, downloads)
}

fn kinds(messages: &[WsMessage]) -> Vec<MessageKind> {
    messages.iter().map(|m| m.kind).collect()
}

#[tokio::test]
async fn every_available_slice_is_built() {
    let (aggregator, book, downloads) = aggregator(FakeDownloads::available());
    book.add(MAGNET).await.unwrap();
    downloads.add("https://example.com/debian.iso").await.unwrap();

    let local = aggregator.local_slices().await;
    assert_eq!(kinds(&local), vec![MessageKind::Torrents, MessageKind::Ffmpeg]);
    assert_eq!(local[0].data[0]["name"], "ubuntu-24.04.iso");
    assert_eq!(local[1].data, json!([]));

    let aria2 = aggregator.downloads_slice().await.unwrap();
    assert_eq!(aria2.kind, MessageKind::Aria2);
    assert_eq!(aria2.data[0]["name"], "debian.iso");
}

#[tokio::test]
async fn unavailable_downloads_are_left_out() {
    let (aggregator, _, _) = aggregator(FakeDownloads::unavailable());

    assert!(aggregator.downloads_slice().await.is_none());
}

#[tokio::test]
async fn failing_downloads_do_not_block_other_slices() {
    let (aggregator, book, _) = aggregator(FakeDownloads::failing());
    book.add(MAGNET).await.unwrap();

    assert!(aggregator.downloads_slice().await.is_none());
    let local = aggregator.local_slices().await;
    assert_eq!(local[0].data.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn bootstrap_adds_capability_flags() {
    let (aggregator, _, _) = aggregator(FakeDownloads::available());

    let bootstrap = aggregator.bootstrap().await;

    assert_eq!(
        kinds(&bootstrap),
        vec![
            MessageKind::Torrents,
            MessageKind::Ffmpeg,
            MessageKind::Aria2Status,
            MessageKind::FfmpegStatus,
        ]
    );
    assert_eq!(bootstrap[2].data, json!({ "available": true }));
    assert_eq!(bootstrap[3].data, json!({ "available": false }));
}

#[tokio::test]
async fn periodic_ticks_reach_connections() {
    let (aggregator, _, _) = aggregator(FakeDownloads::unavailable());
    let registry = Arc::new(ConnectionRegistry::new());
    let (broadcaster, queue) = Broadcaster::new(registry.clone(), 16);
    let _delivery = broadcaster.spawn_delivery(queue);
    let mut rx = registry.register("conn-1".to_string(), Vec::new()).await;

    let ticker = aggregator.spawn(broadcaster, Duration::from_millis(20));

    let mut seen = Vec::new();
    while seen.len() < 4 {
        let msg = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no tick within two seconds")
            .expect("connection channel closed");
        if let Message::Text(text) = msg {
            let parsed: WsMessage = serde_json::from_str(text.as_str()).unwrap();
            seen.push(parsed.kind);
        }
    }
    ticker.abort();

    assert_eq!(
        seen,
        vec![
            MessageKind::Torrents,
            MessageKind::Ffmpeg,
            MessageKind::Torrents,
            MessageKind::Ffmpeg,
        ]
    );
}

// ---------------------------------------------------------------------------
// Test: a stalled download daemon never holds back the local slices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn slow_downloads_do_not_delay_bootstrap() {
    let (aggregator, _, _) = aggregator(FakeDownloads::slow(Duration::from_millis(1500)));

    let started = Instant::now();
    let bootstrap = aggregator.bootstrap().await;

    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(bootstrap[0].kind, MessageKind::Torrents);
}

#[tokio::test]
async fn slow_downloads_do_not_delay_ticks() {
    let (aggregator, _, _) = aggregator(FakeDownloads::slow(Duration::from_millis(1500)));
    let registry = Arc::new(ConnectionRegistry::new());
    let (broadcaster, queue) = Broadcaster::new(registry.clone(), 16);
    let _delivery = broadcaster.spawn_delivery(queue);
    let mut rx = registry.register("conn-1".to_string(), Vec::new()).await;

    let started = Instant::now();
    let ticker = aggregator.spawn(broadcaster, Duration::from_millis(600));

    let mut seen = Vec::new();
    while seen.len() < 2 {
        let msg = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("local slices held back by the download daemon")
            .expect("connection channel closed");
        if let Message::Text(text) = msg {
            let parsed: WsMessage = serde_json::from_str(text.as_str()).unwrap();
            seen.push(parsed.kind);
        }
    }
    ticker.abort();

    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(seen, vec![MessageKind::Torrents, MessageKind::Ffmpeg]);
}
