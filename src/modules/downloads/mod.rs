use axum::routing::{get, post};
use axum::Router;
use crate::state::AppState;

pub mod dto;
pub mod handler;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(handler::aria2_status))
        .route("/add", post(handler::add_download))
        .route("/downloads", get(handler::list_downloads))
        .route("/pause", post(handler::pause_download))
        .route("/resume", post(handler::resume_download))
        .route("/remove", post(handler::remove_download))
}
