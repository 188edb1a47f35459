use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("ffmpeg not available")]
    ToolUnavailable,

    #[error("input file not found: {0}")]
    InputNotFound(String),

    #[error("failed to start transcoder: {0}")]
    SpawnFailure(String),

    #[error("transcoder failed: {0}")]
    RuntimeFailure(String),

    #[error("job not found: {0}")]
    NotFound(String),
}

impl JobError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            JobError::ToolUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            JobError::InputNotFound(_) | JobError::NotFound(_) => StatusCode::NOT_FOUND,
            JobError::SpawnFailure(_) | JobError::RuntimeFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
