//! Command-line arguments for the ota-twin binary
//!
//! Every flag also reads an environment variable; clap gives the flag
//! precedence over the variable.

use std::path::PathBuf;

use clap::Parser;
use ota_common::config::ConfigOverrides;

#[derive(Parser, Debug, Clone)]
#[command(name = "ota-twin")]
#[command(about = "OT Assurance Twin: engineering vs. discovery asset reconciliation service")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "OTA_PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "OTA_BIND")]
    pub bind: Option<String>,

    /// TOML config file (default: <config_dir>/ota-twin/config.toml)
    #[arg(short, long, env = "OTA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "OTA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            bind_address: self.bind.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
        }
    }
}
