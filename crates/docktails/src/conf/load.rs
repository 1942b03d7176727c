//! Load — config loading from file and environment variables.

use std::path::Path;
use std::fs::File;
use std::io::Read;

use super::model::TailConfig;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/docktails/docktails.toml";

impl TailConfig {
    /// Load configuration from file and environment variables.
    /// Priority: Environment Variables > Config File > Defaults
    ///
    /// `explicit_path` (from `--config`) must exist; the fallback paths are
    /// optional.
    pub fn load(explicit_path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = match explicit_path {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path);
                Self::from_file(path)?
            }
            None => {
                let config_path = std::env::var("DOCKTAILS_CONFIG_FILE")
                    .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
                if Path::new(&config_path).exists() {
                    tracing::info!("Loading configuration from: {}", config_path);
                    Self::from_file(&config_path)?
                } else {
                    tracing::debug!("Config file not found at {}, using environment variables", config_path);
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: TailConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Override fields from environment variables. Unparseable values are
    /// ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("DOCKER_HOST") {
            self.docker_host = host;
        }
        if let Some(path) = lookup("DOCKER_CERT_PATH") {
            self.cert_path = path;
        }
        if let Some(pretty) = lookup("DOCKTAILS_PRETTY_JSON").and_then(|s| s.parse().ok()) {
            self.pretty_json = pretty;
        }
        if let Some(prefix) = lookup("DOCKTAILS_PREFIX") {
            self.name_prefix = prefix;
        }
        if let Some(secs) = lookup("DOCKTAILS_RETRY_INTERVAL").and_then(|s| s.parse().ok()) {
            self.retry_interval_secs = secs;
        }
    }
}
