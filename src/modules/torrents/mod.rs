use axum::routing::{get, post};
use axum::Router;
use crate::state::AppState;

pub mod dto;
pub mod handler;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_torrents))
        .route("/add", post(handler::add_torrent))
        .route("/remove", post(handler::remove_torrent))
        .route("/pause", post(handler::pause_torrent))
        .route("/resume", post(handler::resume_torrent))
}
