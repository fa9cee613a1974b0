use epibind::core::service::ServiceError;
use epibind::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prediction service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
