use super::dto::{ConvertRequest, JobIdRequest};
use super::error::JobError;
use super::model::ConversionJob;
use super::service::resolve_input_path;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess, AvailabilityResponse};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

impl From<JobError> for ApiError {
    fn from(e: JobError) -> Self {
        let status = e.status_code();
        ApiError(e.to_string(), status)
    }
}

/// Whether conversions are enabled
#[utoipa::path(
    get,
    path = "/api/ffmpeg/status",
    responses(
        (status = 200, description = "Transcoder availability", body = ApiResponse<AvailabilityResponse>)
    ),
    tag = "Conversions"
)]
pub async fn ffmpeg_status(State(state): State<AppState>) -> impl IntoResponse {
    let available = state.jobs.is_available();
    ApiSuccess(
        ApiResponse::success(AvailabilityResponse { available }, "Transcoder status"),
        StatusCode::OK,
    )
}

/// Queue a conversion
#[utoipa::path(
    post,
    path = "/api/ffmpeg/convert",
    request_body = ConvertRequest,
    responses(
        (status = 200, description = "Job queued", body = ApiResponse<ConversionJob>),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "Input not found"),
        (status = 503, description = "ffmpeg not available")
    ),
    tag = "Conversions"
)]
pub async fn convert(
    State(state): State<AppState>,
    Json(req): Json<ConvertRequest>,
) -> impl IntoResponse {
    if !state.jobs.is_available() {
        return ApiError::from(JobError::ToolUnavailable).into_response();
    }
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_response();
    }

    let input = resolve_input_path(&state.config.download_root, &req.path);
    match state.jobs.submit(&input, req.format_or_default()).await {
        Ok(job) => ApiSuccess(ApiResponse::success(job, "Conversion queued"), StatusCode::OK).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// List conversion jobs
#[utoipa::path(
    get,
    path = "/api/ffmpeg/queue",
    responses(
        (status = 200, description = "Conversion jobs", body = ApiResponse<Vec<ConversionJob>>)
    ),
    tag = "Conversions"
)]
pub async fn queue(State(state): State<AppState>) -> impl IntoResponse {
    let jobs = if state.jobs.is_available() {
        state.jobs.list().await
    } else {
        Vec::new()
    };
    ApiSuccess(ApiResponse::success(jobs, "Conversion queue"), StatusCode::OK)
}

/// Cancel a conversion
#[utoipa::path(
    post,
    path = "/api/ffmpeg/cancel",
    request_body = JobIdRequest,
    responses(
        (status = 200, description = "Job cancelled", body = ApiResponse<ConversionJob>),
        (status = 404, description = "Job not found"),
        (status = 503, description = "ffmpeg not available")
    ),
    tag = "Conversions"
)]
pub async fn cancel(
    State(state): State<AppState>,
    Json(req): Json<JobIdRequest>,
) -> impl IntoResponse {
    if !state.jobs.is_available() {
        return ApiError::from(JobError::ToolUnavailable).into_response();
    }
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_response();
    }

    match state.jobs.cancel(&req.id).await {
        Ok(job) => ApiSuccess(ApiResponse::success(job, "Conversion cancelled"), StatusCode::OK).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Remove a conversion
#[utoipa::path(
    post,
    path = "/api/ffmpeg/remove",
    request_body = JobIdRequest,
    responses(
        (status = 200, description = "Job removed", body = ApiResponse<String>),
        (status = 404, description = "Job not found"),
        (status = 503, description = "ffmpeg not available")
    ),
    tag = "Conversions"
)]
pub async fn remove(
    State(state): State<AppState>,
    Json(req): Json<JobIdRequest>,
) -> impl IntoResponse {
    if !state.jobs.is_available() {
        return ApiError::from(JobError::ToolUnavailable).into_response();
    }
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_response();
    }

    match state.jobs.remove(&req.id).await {
        Ok(()) => ApiSuccess(ApiResponse::success(req.id, "Conversion removed"), StatusCode::OK).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
