/// Feed CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No videos found in {0}")]
    NoMedia(String),

    #[error("Unknown folder: {0}")]
    UnknownFolder(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] fuplay_core::CoreError),

    #[error("Feed error: {0}")]
    Feed(#[from] fuplay_feed::FeedError),
}
