use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConvertRequest {
    #[validate(length(min = 1, message = "No input path provided"))]
    pub path: String,
    /// Defaults to `mp4` when empty.
    #[serde(default)]
    pub format: String,
}

impl ConvertRequest {
    pub fn format_or_default(&self) -> &str {
        let format = self.format.trim();
        if format.is_empty() { "mp4" } else { format }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct JobIdRequest {
    #[validate(length(min = 1, message = "No job ID provided"))]
    pub id: String,
}
