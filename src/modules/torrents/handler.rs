use super::dto::{MagnetRequest, TorrentIdRequest};
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::infrastructure::torrent::TorrentView;
use crate::state::AppState;
use crate::ws::MessageKind;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use validator::Validate;

/// List torrents
#[utoipa::path(
    get,
    path = "/api/torrents",
    responses(
        (status = 200, description = "Tracked torrents", body = ApiResponse<Vec<TorrentView>>)
    ),
    tag = "Torrents"
)]
pub async fn list_torrents(State(state): State<AppState>) -> impl IntoResponse {
    let torrents = state.torrents.list().await;
    ApiSuccess(ApiResponse::success(torrents, "Torrents"), StatusCode::OK)
}

/// Add a magnet link
#[utoipa::path(
    post,
    path = "/api/torrents/add",
    request_body = MagnetRequest,
    responses(
        (status = 200, description = "Torrent added", body = ApiResponse<String>),
        (status = 400, description = "Invalid or duplicate magnet")
    ),
    tag = "Torrents"
)]
pub async fn add_torrent(
    State(state): State<AppState>,
    Json(req): Json<MagnetRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_response();
    }

    match state.torrents.add(&req.magnet).await {
        Ok(true) => {
            state
                .broadcaster
                .emit(MessageKind::TorrentAdded, &json!({ "status": "ok" }))
                .await;
            ApiSuccess(ApiResponse::success(req.magnet, "Torrent added"), StatusCode::OK).into_response()
        }
        Ok(false) => ApiError::bad_request("Torrent already exists").into_response(),
        Err(e) => ApiError::bad_request(e.to_string()).into_response(),
    }
}

/// Remove a torrent
#[utoipa::path(
    post,
    path = "/api/torrents/remove",
    request_body = TorrentIdRequest,
    responses(
        (status = 200, description = "Torrent removed", body = ApiResponse<String>),
        (status = 404, description = "Torrent not found")
    ),
    tag = "Torrents"
)]
pub async fn remove_torrent(
    State(state): State<AppState>,
    Json(req): Json<TorrentIdRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_response();
    }

    match state.torrents.remove(&req.uid).await {
        Ok(true) => {
            state.broadcaster.emit(MessageKind::TorrentRemoved, &req).await;
            ApiSuccess(ApiResponse::success(req.uid, "Torrent removed"), StatusCode::OK).into_response()
        }
        Ok(false) => not_found(),
        Err(e) => ApiError(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// Pause a torrent
#[utoipa::path(
    post,
    path = "/api/torrents/pause",
    request_body = TorrentIdRequest,
    responses(
        (status = 200, description = "Torrent paused", body = ApiResponse<String>),
        (status = 404, description = "Torrent not found")
    ),
    tag = "Torrents"
)]
pub async fn pause_torrent(
    State(state): State<AppState>,
    Json(req): Json<TorrentIdRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_response();
    }

    match state.torrents.pause(&req.uid).await {
        Ok(true) => ApiSuccess(ApiResponse::success(req.uid, "Torrent paused"), StatusCode::OK).into_response(),
        Ok(false) => not_found(),
        Err(e) => ApiError(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// Resume a torrent
#[utoipa::path(
    post,
    path = "/api/torrents/resume",
    request_body = TorrentIdRequest,
    responses(
        (status = 200, description = "Torrent resumed", body = ApiResponse<String>),
        (status = 404, description = "Torrent not found")
    ),
    tag = "Torrents"
)]
pub async fn resume_torrent(
    State(state): State<AppState>,
    Json(req): Json<TorrentIdRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_response();
    }

    match state.torrents.resume(&req.uid).await {
        Ok(true) => ApiSuccess(ApiResponse::success(req.uid, "Torrent resumed"), StatusCode::OK).into_response(),
        Ok(false) => not_found(),
        Err(e) => ApiError(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

fn not_found() -> axum::response::Response {
    ApiError("Torrent not found".to_string(), StatusCode::NOT_FOUND).into_response()
}
