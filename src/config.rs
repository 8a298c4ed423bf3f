//! Configuration
//!
//! Runtime knobs loaded from an optional `config.toml` with `MINI_FTP_*`
//! environment overrides. The control port is not configuration - it is
//! startup input, supplied on the command line or prompted for.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the control listener binds.
    pub bind_address: String,

    /// Directory served to clients, for listings and file requests.
    pub server_root: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            server_root: ".".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration, falling back to defaults when no config file
    /// or environment overrides are present.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0")?
            .set_default("server_root", ".")?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("MINI_FTP"))
            .build()?
            .try_deserialize()
    }

    /// The served root as a path.
    pub fn server_root_path(&self) -> PathBuf {
        PathBuf::from(&self.server_root)
    }
}
