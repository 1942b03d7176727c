//! Model — TailConfig and derived views.

use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};

use super::tls::TlsMaterial;
use crate::docker::client::DockerEndpoint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailConfig {
    /// Docker daemon address (`DOCKER_HOST`). Empty = library defaults.
    pub docker_host: String,
    /// Directory holding `ca.pem`, `cert.pem` and `key.pem` (`DOCKER_CERT_PATH`).
    pub cert_path: String,
    pub pretty_json: bool,
    /// Only containers whose name starts with this are tailed.
    pub name_prefix: String,
    pub retry_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            docker_host: "".to_string(),
            cert_path: "".to_string(),
            pretty_json: true,
            name_prefix: "".to_string(),
            retry_interval_secs: 5,
            request_timeout_secs: 120,
        }
    }
}

impl TailConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    pub fn tls_material(&self) -> Option<TlsMaterial> {
        let dir = self.cert_path.trim();
        if dir.is_empty() {
            None
        } else {
            Some(TlsMaterial::from_cert_dir(&PathBuf::from(dir)))
        }
    }

    pub fn endpoint(&self) -> DockerEndpoint {
        DockerEndpoint {
            host: self.docker_host.trim().to_string(),
            tls: self.tls_material(),
            timeout_secs: self.request_timeout_secs,
        }
    }

    /// Validate configuration values. TLS files are checked at connect time
    /// so that a missing certificate is retried like any connection failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.retry_interval_secs == 0 {
            return Err("retry_interval_secs must be > 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}
