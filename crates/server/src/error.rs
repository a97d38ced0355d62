//! API error types.

use axum::http::header::X_CONTENT_TYPE_OPTIONS;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use cass_storage::StoreError;

/// Failure to obtain the content to store.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no such file: multipart field `file` is missing")]
    MissingFileField,

    #[error("malformed multipart form: {0}")]
    Multipart(String),

    #[error("missing form value `url`")]
    MissingUrl,

    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("connection failed: {0}")]
    ConnectFailed(String),

    #[error("timed out: {0}")]
    TimeoutExceeded(String),

    #[error("remote server responded with {status}")]
    NonSuccessStatus { status: reqwest::StatusCode },

    #[error("request failed: {0}")]
    Request(String),
}

impl FetchError {
    /// Classify an HTTP client error, keeping its full cause chain as the message.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let detail = error_chain(&err);
        if err.is_timeout() {
            Self::TimeoutExceeded(detail)
        } else if err.is_connect() {
            Self::ConnectFailed(detail)
        } else {
            Self::Request(detail)
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for FetchError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Self::Multipart(err.body_text())
    }
}

/// `err` followed by each of its sources, joined with ": ".
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// API error type.
///
/// Every failure is reported as a 500 whose plain-text body is the error
/// message followed by a newline.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Request failed");
        let mut response = (self.status_code(), format!("{self}\n")).into_response();
        response
            .headers_mut()
            .insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        response
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
