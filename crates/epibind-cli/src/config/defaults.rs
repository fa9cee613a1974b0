use epibind::core::service::iedb;
use epibind::engine::config as core_config;
use std::path::PathBuf;
use std::time::Duration;

pub struct DefaultsConfig {
    pub species: String,
    pub method: String,
    pub workers: usize,
    pub output_dir: PathBuf,
    pub max_retries: usize,
    pub retry_delay: Duration,
    pub jitter: core_config::DelayRange,
    pub stagger: core_config::DelayRange,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            species: "mouse".to_string(),
            method: core_config::DEFAULT_METHOD.to_string(),
            workers: core_config::DEFAULT_WORKER_COUNT,
            output_dir: PathBuf::from("results"),
            max_retries: core_config::DEFAULT_MAX_RETRIES,
            retry_delay: core_config::DEFAULT_RETRY_DELAY,
            jitter: core_config::DEFAULT_JITTER,
            stagger: core_config::DEFAULT_STAGGER,
            endpoint: iedb::DEFAULT_ENDPOINT.to_string(),
            timeout: iedb::DEFAULT_TIMEOUT,
        }
    }
}
