//! Error types for schema tree generation

use std::path::PathBuf;

use thiserror::Error;

/// Result type for schema tree operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema tree errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Cannot read schema file {path:?}: {source}")]
    ReadSchema {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write output file {path:?}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Inheritance cycle detected: {}", .members.join(" -> "))]
    Cycle { members: Vec<String> },

    #[error("Schema rejected in strict mode: {errors} malformed span(s) skipped")]
    Rejected { errors: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
