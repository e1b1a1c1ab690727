//! Binding error types.
//!
//! Every failure the binder or the validation step reports to a client is
//! an [`HttpError`]: a kind that fixes the HTTP status, plus one or more
//! human-readable messages using wire names.

use http::StatusCode;

/// What went wrong, at the granularity of an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input: JSON syntax or type errors, unparseable values.
    BadRequest,
    /// Body larger than the configured limit.
    PayloadTooLarge,
    /// Body present with a content type the binder does not read.
    UnsupportedMediaType,
    /// Bound values failed validation rules.
    ValidationFailed,
    /// Reserved for failures that indicate a server-side bug.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status for this kind.
    pub fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code suitable for error envelopes.
    pub fn error_code(self) -> &'static str {
        match self {
            Self::BadRequest => "INVALID_PARAMETER",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::Internal => "BINDING_FAILED",
        }
    }
}

/// A request-level binding or validation failure.
///
/// # Example
///
/// ```rust
/// use bindery_extract::{ErrorKind, HttpError};
/// use http::StatusCode;
///
/// let err = HttpError::bad_request("limit: invalid integer \"ten\"");
/// assert_eq!(err.status(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.kind(), ErrorKind::BadRequest);
///
/// let err = HttpError::unsupported_media_type();
/// assert_eq!(err.messages(), ["Unsupported Media Type"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .messages.join(", "))]
pub struct HttpError {
    kind: ErrorKind,
    messages: Vec<String>,
}

impl HttpError {
    /// Creates an error with one message.
    ///
    /// An empty message is replaced by the status reason phrase.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            kind.status()
                .canonical_reason()
                .unwrap_or_default()
                .to_string()
        } else {
            message
        };
        Self {
            kind,
            messages: vec![message],
        }
    }

    /// Creates an error carrying several messages, in order.
    pub fn with_messages(kind: ErrorKind, messages: Vec<String>) -> Self {
        if messages.is_empty() {
            return Self::new(kind, "");
        }
        Self { kind, messages }
    }

    /// Malformed input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Body present with an unreadable content type.
    pub fn unsupported_media_type() -> Self {
        Self::new(ErrorKind::UnsupportedMediaType, "")
    }

    /// Body over the size limit.
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self::new(
            ErrorKind::PayloadTooLarge,
            format!("payload too large: max {max_size} bytes, got {actual_size} bytes"),
        )
    }

    /// Validation failures, one message per violated rule.
    pub fn validation_failed(messages: Vec<String>) -> Self {
        Self::with_messages(ErrorKind::ValidationFailed, messages)
    }

    /// Returns the kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the HTTP status.
    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    /// Returns the error code suitable for error envelopes.
    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    /// Returns the messages. Never empty.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}
