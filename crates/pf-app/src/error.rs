//! Error types for the pf-app service layer.

use std::path::PathBuf;

/// Application error type shared by every front end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Component(#[from] pf_components::ComponentError),

    #[error(transparent)]
    Compose(#[from] pf_compose::ComposeError),

    #[error(transparent)]
    Route(#[from] pf_routing::RouteError),

    #[error(transparent)]
    Cache(#[from] pf_cache::CacheError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pf-app operations.
pub type AppResult<T> = Result<T, AppError>;
