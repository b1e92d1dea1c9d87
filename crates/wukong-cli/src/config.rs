//! Configuration loading and types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wukong_client::ClientConfig;

/// Top-level configuration for the wukong CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// CLI settings
    #[serde(default)]
    pub cli: CliConfig,
    /// Solr cluster settings
    #[serde(default)]
    pub client: ClientConfig,
}

/// CLI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from default paths or use defaults
    ///
    /// # Errors
    /// Returns error if a config file exists but cannot be read or parsed
    pub fn load_default() -> eyre::Result<Self> {
        if let Ok(path) = std::env::var("WUKONG_CONFIG") {
            return Self::load(&PathBuf::from(path));
        }

        let mut paths = vec![PathBuf::from("wukong.toml")];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("wukong/wukong.toml"));
        }

        for path in paths {
            if path.exists() {
                return Self::load(&path);
            }
        }

        Ok(Config::default())
    }

    /// Apply command-line overrides on top of file values
    pub fn apply_overrides(&mut self, hosts: &[String], discover: &[String], timeout: Option<u64>) {
        if !hosts.is_empty() {
            self.client.solr_hosts = hosts.to_vec();
        }
        if !discover.is_empty() {
            self.client.discovery_hosts = Some(discover.to_vec());
        }
        if let Some(secs) = timeout {
            self.client.timeout_secs = secs;
        }
    }
}
