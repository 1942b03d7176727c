//! Client module — the Docker seam the runtime is written against.

pub mod docker;
pub mod fake;
pub mod live;

pub use docker::{Connector, DockerOps, EventStream};
pub use live::LiveConnector;
