//! Runtime module — boot, the connection manager, the orchestrator loop and
//! shutdown.

pub mod boot;
pub mod connect;
pub mod orchestrator;
pub mod stop;

pub use orchestrator::Orchestrator;
