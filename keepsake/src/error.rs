use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeepsakeError {
    #[error("Blob store error: {0}")]
    Blob(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Image CDN error: {0}")]
    Cdn(String),

    #[error("Verification error: {0}")]
    Verification(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, KeepsakeError>;
