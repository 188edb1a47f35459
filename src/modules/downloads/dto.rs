use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddDownloadRequest {
    #[validate(length(min = 1, message = "No URL provided"))]
    pub url: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GidRequest {
    #[validate(length(min = 1, message = "No GID provided"))]
    pub gid: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddDownloadResponse {
    pub gid: String,
}
