//! Docker trait — abstract interface for the Docker operations the tailer
//! needs.
//!
//! The orchestrator and tail sessions reach Docker only through this trait.
//! `live.rs` provides the real Bollard-backed implementation.
//! `fake.rs` provides a test double.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_stream::Stream;

use crate::docker::client::DockerError;
use crate::docker::event::ContainerEvent;
use crate::docker::inventory::ContainerInfo;
use crate::docker::stream::{LogStream, LogStreamRequest};

pub type EventStream = Pin<Box<dyn Stream<Item = Result<ContainerEvent, DockerError>> + Send>>;

/// Unified async interface over the Docker daemon.
///
/// Object-safe thanks to `Pin<Box<…>>` returns.
/// Implementations must be `Send + Sync` so they can be shared as
/// `Arc<dyn DockerOps>` by every session task.
pub trait DockerOps: Send + Sync {
    /// Liveness probe.
    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), DockerError>> + Send + '_>>;

    /// All containers, running or not.
    fn list_containers(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ContainerInfo>, DockerError>> + Send + '_>>;

    fn inspect_container<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ContainerInfo, DockerError>> + Send + 'a>>;

    fn stream_logs(
        &self,
        request: LogStreamRequest,
    ) -> Pin<Box<dyn Future<Output = Result<LogStream, DockerError>> + Send + '_>>;

    /// Container lifecycle events. The stream is independent of `&self`
    /// and ends when the daemon connection drops.
    fn stream_events(&self) -> EventStream;
}

/// Builds clients for the connection manager.
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Arc<dyn DockerOps>, DockerError>;

    /// Target description for log lines.
    fn describe(&self) -> String;
}
