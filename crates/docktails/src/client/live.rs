//! Live — implements `DockerOps` for the real Bollard-backed `DockerClient`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::client::docker::{Connector, DockerOps, EventStream};
use crate::docker::client::{DockerClient, DockerEndpoint, DockerError};
use crate::docker::inventory::ContainerInfo;
use crate::docker::stream::{LogStream, LogStreamRequest};

impl DockerOps for DockerClient {
    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), DockerError>> + Send + '_>> {
        Box::pin(DockerClient::ping(self))
    }

    fn list_containers(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ContainerInfo>, DockerError>> + Send + '_>> {
        Box::pin(DockerClient::list_containers(self))
    }

    fn inspect_container<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ContainerInfo, DockerError>> + Send + 'a>> {
        Box::pin(DockerClient::inspect_container(self, id))
    }

    fn stream_logs(
        &self,
        request: LogStreamRequest,
    ) -> Pin<Box<dyn Future<Output = Result<LogStream, DockerError>> + Send + '_>> {
        Box::pin(DockerClient::stream_logs(self, request))
    }

    fn stream_events(&self) -> EventStream {
        Box::pin(DockerClient::stream_events(self))
    }
}

/// Connects to the configured endpoint with bollard.
#[derive(Debug, Clone)]
pub struct LiveConnector {
    endpoint: DockerEndpoint,
}

impl LiveConnector {
    pub fn new(endpoint: DockerEndpoint) -> Self {
        Self { endpoint }
    }
}

impl Connector for LiveConnector {
    fn connect(&self) -> Result<Arc<dyn DockerOps>, DockerError> {
        let client = DockerClient::connect(&self.endpoint)?;
        Ok(Arc::new(client))
    }

    fn describe(&self) -> String {
        self.endpoint.describe()
    }
}
