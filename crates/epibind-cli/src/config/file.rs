use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileRetryConfig {
    pub max_retries: Option<usize>,
    pub delay_secs: Option<f64>,
    pub jitter_min_secs: Option<f64>,
    pub jitter_max_secs: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileStaggerConfig {
    pub min_secs: Option<f64>,
    pub max_secs: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileServiceConfig {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub species: Option<String>,
    pub alleles: Option<String>,
    pub method: Option<String>,
    pub workers: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub retry: Option<FileRetryConfig>,
    pub stagger: Option<FileStaggerConfig>,
    pub service: Option<FileServiceConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
