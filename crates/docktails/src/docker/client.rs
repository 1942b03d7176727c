//! Docker client — core struct, constructor, error types.
//!
//! Domain methods live in sibling modules (`container`, `event`) which add
//! `impl DockerClient` blocks.

use bollard::Docker;
use thiserror::Error;

use crate::conf::TlsMaterial;

#[derive(Error, Debug)]
pub enum DockerError {
    #[error("Docker connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Invalid TLS material: {0}")]
    InvalidTls(String),
    #[error("Container not found: {0}")]
    ContainerNotFound(String),
    #[error("Stream closed")]
    StreamClosed,
    #[error("Bollard error: {0}")]
    BollardError(#[from] bollard::errors::Error),
}

/// Where the Docker daemon lives and which credentials reach it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DockerEndpoint {
    /// `DOCKER_HOST`-style address. Empty means "library defaults".
    pub host: String,
    pub tls: Option<TlsMaterial>,
    pub timeout_secs: u64,
}

/// How [`DockerClient::connect`] reaches the daemon for a given endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Whatever bollard derives from the environment (local socket otherwise).
    Defaults,
    /// Local unix socket at an explicit path.
    Socket,
    /// Remote daemon secured with client certificates.
    Tls,
    /// Remote daemon over plain HTTP.
    Http,
}

impl DockerEndpoint {
    pub fn transport(&self) -> Transport {
        let host = self.host.trim();
        if host.is_empty() {
            Transport::Defaults
        } else if host.starts_with("unix://") || host.starts_with('/') {
            Transport::Socket
        } else if self.tls.is_some() {
            Transport::Tls
        } else {
            Transport::Http
        }
    }

    /// Human readable target for log lines.
    pub fn describe(&self) -> String {
        match self.transport() {
            Transport::Defaults => "default docker host".to_string(),
            Transport::Tls => format!("{} (tls)", self.host),
            _ => self.host.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DockerClient {
    /// The bollard Docker client.  `pub(super)` so that domain modules
    /// in sibling files can call bollard APIs directly.
    pub(super) client: Docker,
}

impl DockerClient {
    /// Build a client for `endpoint`. This does not touch the network;
    /// use [`DockerClient::ping`] to check liveness.
    pub fn connect(endpoint: &DockerEndpoint) -> Result<Self, DockerError> {
        let timeout = endpoint.timeout_secs;
        let connection = match endpoint.transport() {
            Transport::Defaults => Docker::connect_with_defaults()
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?,
            Transport::Socket => {
                let clean_path = endpoint.host.trim().trim_start_matches("unix://");
                Docker::connect_with_socket(clean_path, timeout, &bollard::API_DEFAULT_VERSION)
                    .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
            }
            Transport::Tls => {
                let tls = endpoint
                    .tls
                    .as_ref()
                    .ok_or_else(|| DockerError::InvalidTls("no TLS material configured".into()))?;
                tls.verify().map_err(DockerError::InvalidTls)?;
                Docker::connect_with_ssl(
                    endpoint.host.trim(),
                    &tls.key,
                    &tls.cert,
                    &tls.ca,
                    timeout,
                    &bollard::API_DEFAULT_VERSION,
                )
                .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
            }
            Transport::Http => {
                Docker::connect_with_http(endpoint.host.trim(), timeout, &bollard::API_DEFAULT_VERSION)
                    .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?
            }
        };

        Ok(DockerClient { client: connection })
    }

    /// Liveness probe against the daemon.
    pub async fn ping(&self) -> Result<(), DockerError> {
        self.client.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tls() -> TlsMaterial {
        TlsMaterial::from_cert_dir(&PathBuf::from("/certs"))
    }

    #[test]
    fn test_empty_host_uses_defaults() {
        let endpoint = DockerEndpoint::default();
        assert_eq!(endpoint.transport(), Transport::Defaults);
        assert_eq!(endpoint.describe(), "default docker host");
    }

    #[test]
    fn test_unix_socket_hosts() {
        for host in ["unix:///var/run/docker.sock", "/var/run/docker.sock"] {
            let endpoint = DockerEndpoint {
                host: host.to_string(),
                tls: Some(tls()),
                timeout_secs: 120,
            };
            assert_eq!(endpoint.transport(), Transport::Socket, "host {}", host);
        }
    }

    #[test]
    fn test_remote_host_with_certs_uses_tls() {
        let endpoint = DockerEndpoint {
            host: "tcp://10.0.0.5:2376".to_string(),
            tls: Some(tls()),
            timeout_secs: 120,
        };
        assert_eq!(endpoint.transport(), Transport::Tls);
        assert_eq!(endpoint.describe(), "tcp://10.0.0.5:2376 (tls)");
    }

    #[test]
    fn test_remote_host_without_certs_uses_http() {
        let endpoint = DockerEndpoint {
            host: "tcp://10.0.0.5:2375".to_string(),
            tls: None,
            timeout_secs: 120,
        };
        assert_eq!(endpoint.transport(), Transport::Http);
    }

    #[test]
    fn test_tls_connect_rejects_missing_material() {
        let endpoint = DockerEndpoint {
            host: "tcp://10.0.0.5:2376".to_string(),
            tls: Some(TlsMaterial::from_cert_dir(&PathBuf::from("/nonexistent/docktails"))),
            timeout_secs: 120,
        };
        let err = DockerClient::connect(&endpoint).unwrap_err();
        assert!(matches!(err, DockerError::InvalidTls(_)), "got {:?}", err);
    }
}
