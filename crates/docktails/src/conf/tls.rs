//! TLS — client certificate material for remote Docker daemons.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rustls_pemfile::Item;

/// Paths to the CA, client certificate and client key, laid out the way
/// `docker --tlsverify` expects them in `DOCKER_CERT_PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    pub ca: PathBuf,
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TlsMaterial {
    pub fn from_cert_dir(dir: &Path) -> Self {
        Self {
            ca: dir.join("ca.pem"),
            cert: dir.join("cert.pem"),
            key: dir.join("key.pem"),
        }
    }

    /// Check that all three files exist and hold what they claim to.
    pub fn verify(&self) -> Result<(), String> {
        validate_file(&self.ca, "CA certificate")?;
        validate_file(&self.cert, "TLS certificate")?;
        validate_file(&self.key, "TLS key")?;

        require_certs(&self.ca, "CA certificate")?;
        require_certs(&self.cert, "TLS certificate")?;

        let file = File::open(&self.key).map_err(|e| format!("TLS key: {}", e))?;
        let mut reader = BufReader::new(file);
        match rustls_pemfile::private_key(&mut reader) {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(format!("No private key found in {}", self.key.display())),
            Err(e) => Err(format!("TLS key {}: {}", self.key.display(), e)),
        }
    }
}

fn validate_file(path: &Path, name: &str) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("{} not found at: {}", name, path.display()));
    }
    Ok(())
}

fn require_certs(path: &Path, name: &str) -> Result<(), String> {
    let file = File::open(path).map_err(|e| format!("{}: {}", name, e))?;
    let mut reader = BufReader::new(file);
    let mut found = 0usize;
    for item in rustls_pemfile::read_all(&mut reader) {
        match item {
            Ok(Item::X509Certificate(_)) => found += 1,
            Ok(_) => {}
            Err(e) => return Err(format!("{} {}: {}", name, path.display(), e)),
        }
    }
    if found == 0 {
        return Err(format!("No certificate found in {}", path.display()));
    }
    Ok(())
}
