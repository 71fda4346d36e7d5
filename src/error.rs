use thiserror::Error;

pub use crate::analyzer::security::SecurityError;
pub use crate::fetcher::FetchError;

#[derive(Error, Debug)]
pub enum AuditorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Security pattern error: {0}")]
    Security(#[from] SecurityError),

    #[error("Contract fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Configuration parsing failed: {0}")]
    ParsingFailed(String),
}

pub type Result<T> = std::result::Result<T, AuditorError>;
