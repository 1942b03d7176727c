//! Conf module — configuration model, loading, and TLS material.

pub mod model;
pub mod load;
pub mod tls;

pub use model::TailConfig;
pub use tls::TlsMaterial;
