use super::dto::{AddDownloadRequest, AddDownloadResponse, GidRequest};
use crate::common::response::{ApiError, ApiResponse, ApiSuccess, AvailabilityResponse};
use crate::infrastructure::aria2::DownloadView;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

const SERVICE: &str = "aria2";

fn rpc_error(e: anyhow::Error) -> ApiError {
    ApiError(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
}

/// Whether the download daemon is reachable
#[utoipa::path(
    get,
    path = "/api/aria2/status",
    responses(
        (status = 200, description = "aria2 availability", body = ApiResponse<AvailabilityResponse>)
    ),
    tag = "Downloads"
)]
pub async fn aria2_status(State(state): State<AppState>) -> impl IntoResponse {
    let available = state.downloads.available();
    ApiSuccess(
        ApiResponse::success(AvailabilityResponse { available }, "aria2 status"),
        StatusCode::OK,
    )
}

/// Queue a URL download
#[utoipa::path(
    post,
    path = "/api/aria2/add",
    request_body = AddDownloadRequest,
    responses(
        (status = 200, description = "Download queued", body = ApiResponse<AddDownloadResponse>),
        (status = 400, description = "Bad Request"),
        (status = 503, description = "aria2 not available")
    ),
    tag = "Downloads"
)]
pub async fn add_download(
    State(state): State<AppState>,
    Json(req): Json<AddDownloadRequest>,
) -> impl IntoResponse {
    if !state.downloads.available() {
        return ApiError::unavailable(SERVICE).into_response();
    }
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_response();
    }

    match state.downloads.add(req.url.trim()).await {
        Ok(gid) => {
            tracing::info!(gid = %gid, "Download added");
            ApiSuccess(
                ApiResponse::success(AddDownloadResponse { gid }, "Download added"),
                StatusCode::OK,
            )
            .into_response()
        }
        Err(e) => rpc_error(e).into_response(),
    }
}

/// List downloads
#[utoipa::path(
    get,
    path = "/api/aria2/downloads",
    responses(
        (status = 200, description = "Active, waiting and recently stopped downloads", body = ApiResponse<Vec<DownloadView>>)
    ),
    tag = "Downloads"
)]
pub async fn list_downloads(State(state): State<AppState>) -> impl IntoResponse {
    if !state.downloads.available() {
        return ApiSuccess(ApiResponse::success(Vec::<DownloadView>::new(), "Downloads"), StatusCode::OK)
            .into_response();
    }

    match state.downloads.list().await {
        Ok(list) => ApiSuccess(ApiResponse::success(list, "Downloads"), StatusCode::OK).into_response(),
        Err(e) => rpc_error(e).into_response(),
    }
}

/// Pause a download
#[utoipa::path(
    post,
    path = "/api/aria2/pause",
    request_body = GidRequest,
    responses(
        (status = 200, description = "Download paused", body = ApiResponse<String>),
        (status = 503, description = "aria2 not available")
    ),
    tag = "Downloads"
)]
pub async fn pause_download(
    State(state): State<AppState>,
    Json(req): Json<GidRequest>,
) -> impl IntoResponse {
    if !state.downloads.available() {
        return ApiError::unavailable(SERVICE).into_response();
    }
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_response();
    }

    match state.downloads.pause(&req.gid).await {
        Ok(()) => ApiSuccess(ApiResponse::success(req.gid, "Download paused"), StatusCode::OK).into_response(),
        Err(e) => rpc_error(e).into_response(),
    }
}

/// Resume a download
#[utoipa::path(
    post,
    path = "/api/aria2/resume",
    request_body = GidRequest,
    responses(
        (status = 200, description = "Download resumed", body = ApiResponse<String>),
        (status = 503, description = "aria2 not available")
    ),
    tag = "Downloads"
)]
pub async fn resume_download(
    State(state): State<AppState>,
    Json(req): Json<GidRequest>,
) -> impl IntoResponse {
    if !state.downloads.available() {
        return ApiError::unavailable(SERVICE).into_response();
    }
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_response();
    }

    match state.downloads.resume(&req.gid).await {
        Ok(()) => ApiSuccess(ApiResponse::success(req.gid, "Download resumed"), StatusCode::OK).into_response(),
        Err(e) => rpc_error(e).into_response(),
    }
}

/// Remove a download
#[utoipa::path(
    post,
    path = "/api/aria2/remove",
    request_body = GidRequest,
    responses(
        (status = 200, description = "Download removed", body = ApiResponse<String>),
        (status = 503, description = "aria2 not available")
    ),
    tag = "Downloads"
)]
pub async fn remove_download(
    State(state): State<AppState>,
    Json(req): Json<GidRequest>,
) -> impl IntoResponse {
    if !state.downloads.available() {
        return ApiError::unavailable(SERVICE).into_response();
    }
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_response();
    }

    match state.downloads.remove(&req.gid).await {
        Ok(()) => ApiSuccess(ApiResponse::success(req.gid, "Download removed"), StatusCode::OK).into_response(),
        Err(e) => rpc_error(e).into_response(),
    }
}
