use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by [`crate::ApiClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authorization rejected with status {0}")]
    Unauthorized(StatusCode),
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}
