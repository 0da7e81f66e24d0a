#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// Map a non-success response status to an error
    pub(crate) fn from_status(status: reqwest::StatusCode, url: &str) -> Self {
        if status == reqwest::StatusCode::NOT_FOUND {
            FetchError::NotFound(url.to_string())
        } else {
            FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
        }
    }
}
