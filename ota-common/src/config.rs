//! Configuration loading
//!
//! Resolution order, highest priority first:
//! 1. Command-line argument (or its environment variable, resolved by the
//!    binary's argument parser)
//! 2. TOML config file (`--config` path, else the platform config directory)
//! 3. Compiled defaults
//!
//! A missing default config file is not an error: the service starts on
//! defaults and reports where it looked. An explicitly named file that is
//! missing, or any file that fails to parse, is a configuration error.
//!
//! Resolution runs before logging is initialized, so it reports its source
//! through [`ConfigSource`] instead of logging.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::metrics::ScoringWeights;
use crate::{Error, Result};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_THRESHOLD_MONTHS: u32 = 12;
pub const DEFAULT_HIGH_RISK_THRESHOLD: u32 = 70;

/// Service configuration as stored in TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Request body cap for CSV uploads
    pub max_upload_bytes: usize,
    /// Stale-observation threshold when a request does not set one
    pub default_threshold_months: u32,
    pub high_risk_threshold: u32,
    pub scoring: ScoringWeights,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            default_threshold_months: DEFAULT_THRESHOLD_MONTHS,
            high_risk_threshold: DEFAULT_HIGH_RISK_THRESHOLD,
            scoring: ScoringWeights::default(),
        }
    }
}

impl ServiceConfig {
    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.bind_address.trim().is_empty() {
            return Err(Error::Config("bind_address must not be empty".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::Config("max_upload_bytes must be greater than 0".to_string()));
        }
        for (name, value) in self.scoring.entries() {
            if value > ScoringWeights::MAX_WEIGHT {
                return Err(Error::Config(format!(
                    "scoring.{} must be between 0 and {} (got {})",
                    name,
                    ScoringWeights::MAX_WEIGHT,
                    value
                )));
            }
        }
        if self.high_risk_threshold > 100 {
            return Err(Error::Config(format!(
                "high_risk_threshold must be between 0 and 100 (got {})",
                self.high_risk_threshold
            )));
        }
        Ok(())
    }

    /// `host:port` string for binding the listener
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Values supplied on the command line (or via their environment variables)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file found; `searched` is the default location, if one exists
    Defaults { searched: Option<PathBuf> },
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults { searched: Some(path) } => {
                write!(f, "compiled defaults (no file at {})", path.display())
            }
            ConfigSource::Defaults { searched: None } => {
                write!(f, "compiled defaults (no config directory)")
            }
        }
    }
}

/// Effective configuration plus its provenance
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: ServiceConfig,
    pub source: ConfigSource,
}

/// Platform config file location: `<config_dir>/ota-twin/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ota-twin").join("config.toml"))
}

/// Read and parse one TOML config file
pub fn load_toml_config(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse config {} failed: {}", path.display(), e)))
}

/// Resolve the effective configuration
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let (mut config, source) = match &overrides.config_path {
        Some(path) => (load_toml_config(path)?, ConfigSource::File(path.clone())),
        None => match default_config_path() {
            Some(path) if path.exists() => (load_toml_config(&path)?, ConfigSource::File(path)),
            searched => (ServiceConfig::default(), ConfigSource::Defaults { searched }),
        },
    };

    if let Some(bind_address) = &overrides.bind_address {
        config.bind_address = bind_address.clone();
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(log_level) = &overrides.log_level {
        config.log_level = log_level.clone();
    }

    config.validate()?;
    Ok(ResolvedConfig { config, source })
}

/// Serialize a config to TOML (used to print an example file)
pub fn to_toml_string(config: &ServiceConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))
}
