use axum::routing::{get, post};
use axum::Router;
use crate::state::AppState;

pub mod dto;
pub mod error;
pub mod handler;
pub mod model;
pub mod profile;
pub mod progress;
pub mod registry;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(handler::ffmpeg_status))
        .route("/convert", post(handler::convert))
        .route("/queue", get(handler::queue))
        .route("/cancel", post(handler::cancel))
        .route("/remove", post(handler::remove))
}
