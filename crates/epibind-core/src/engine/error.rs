use super::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a run before or while the worker pool is being set up.
///
/// Failures of individual records are never reported through this type; they
/// end up in the record's `TaskReport` instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid run configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Duplicate record identifiers would overwrite each other's output: {}", .ids.join(", "))]
    DuplicateRecords { ids: Vec<String> },

    #[error("Failed to create output directories under '{path}': {source}", path = path.display())]
    OutputLayout {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    PoolStart(String),
}
