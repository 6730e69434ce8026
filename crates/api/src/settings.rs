//! Application Configuration
//!
//! Layered from defaults, an optional TOML file and `PRICE_ESTIMATOR__*`
//! environment variables (e.g. `PRICE_ESTIMATOR__MODEL__PATH`).

use config::{Config, ConfigError, Environment, File};
use data_validator::ValidationConfig;
use feature_engine::EncodeOptions;
use inference_engine::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "price-estimator.toml";

/// Environment variable overriding the configuration file path
pub const CONFIG_PATH_ENV: &str = "PRICE_ESTIMATOR_CONFIG";

const ENV_PREFIX: &str = "PRICE_ESTIMATOR";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub encoding: EncodeOptions,
    pub validation: ValidationConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,
    /// Install the Prometheus recorder and serve `/metrics`
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            metrics: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Load configuration.
///
/// The file is `path` if given, else `$PRICE_ESTIMATOR_CONFIG`, else
/// [`DEFAULT_CONFIG_FILE`]; a missing file is not an error.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    Config::builder()
        .add_source(File::from(path.as_path()).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()
}
