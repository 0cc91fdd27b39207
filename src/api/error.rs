use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}
