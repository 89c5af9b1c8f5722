//! Error types for the catalog

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl From<CatalogError> for fuplay_core::CoreError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Io(io) => fuplay_core::CoreError::Io(io),
            CatalogError::FileNotFound(path) => fuplay_core::CoreError::not_found("Path", path),
            other => fuplay_core::CoreError::catalog(other.to_string()),
        }
    }
}
