//! Logs module — per-container tail sessions and the registry that keeps
//! them unique.

pub mod registry;
pub mod session;

pub use registry::{ClaimMode, SessionGuard, SessionRegistry};
pub use session::{is_tailable, launch};
