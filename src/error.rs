use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Browser error: {0}")]
    Browser(String),
    #[error("Failed to launch browser: {0}")]
    Launch(String),
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("Navigation to {url} did not settle within {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },
    #[error("Page not ready: no navigation has completed on this session")]
    PageNotReady,
    #[error("Selector error: {0}")]
    Selector(String),
    #[error("Schema mismatch for {source_key}: schema maps {expected} columns, page rows carry {found}")]
    SchemaMismatch {
        source_key: String,
        expected: usize,
        found: usize,
    },
    #[error("Schema mismatch for {source_key}: all {rejected} rows failed strict decoding")]
    UndecodableTable {
        source_key: String,
        rejected: usize,
    },
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

impl From<chromiumoxide::error::CdpError> for ScrapeError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ScrapeError::Browser(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
