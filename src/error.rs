//! Error types for podclip.

use thiserror::Error;

/// Library-level error type for podclip operations.
#[derive(Error, Debug)]
pub enum PodclipError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Media download failed: {0}")]
    MediaFetch(String),

    #[error("Media transform failed: {0}")]
    MediaTransform(String),

    #[error("Subtitle error: {0}")]
    Subtitle(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Selector integrity failure: {0}")]
    SelectorIntegrity(String),

    #[error("Every discovered podcast is already published, even with the widest search window")]
    RetryExhausted,

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Publish credentials expired: {0}")]
    PublishAuth(String),

    #[error("Exclusion store error: {0}")]
    Exclusion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PodclipError {
    /// Whether this error means the upload credentials are no longer usable.
    pub fn is_credential_failure(&self) -> bool {
        matches!(self, PodclipError::PublishAuth(_))
    }
}

/// Result type alias for podclip operations.
pub type Result<T> = std::result::Result<T, PodclipError>;
