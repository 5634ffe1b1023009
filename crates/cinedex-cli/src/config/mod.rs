//! Application configuration module.
//!
//! Manages the TOML config file holding API endpoint settings.
//! Credentials are never read from or written to this file.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{ApiConfig, AppConfig};
pub use paths::resolve_config_path;
