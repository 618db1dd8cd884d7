//! Error types shared across the engine

/// Result type for transcript sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error types for transcript sync operations
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Playback source unavailable")]
    PlayerUnavailable,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Summarizer error: {0}")]
    Summarizer(String),
}
