//! Docker module — bollard-backed client, container views, log and event streams.

pub mod client;
pub mod container;
pub mod event;
pub mod inventory;
pub mod stream;

pub use client::{DockerClient, DockerEndpoint, DockerError};
pub use event::{ContainerEvent, EventKind};
pub use inventory::{short_id, ContainerInfo};
pub use stream::{LogChunk, LogStream, LogStreamRequest, StreamKind};
