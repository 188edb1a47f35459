use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MagnetRequest {
    #[validate(length(min = 1, message = "No magnet link provided"))]
    pub magnet: String,
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct TorrentIdRequest {
    #[validate(length(min = 1, message = "No torrent ID provided"))]
    pub uid: String,
}
