//! Layered run configuration: CLI flags, then `--set` overrides, then the TOML
//! config file, then built-in defaults.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use models::{AppConfig, ServiceSettings};
