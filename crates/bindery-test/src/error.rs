//! Test error types.

/// Errors that can occur while building test requests.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    /// Request building failed
    #[error("Request build error: {0}")]
    RequestBuild(String),
    /// Header name or value is invalid
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Form serialization failed
    #[error("Form error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),
}
