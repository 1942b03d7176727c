//! Container domain — list, inspect, and log streaming.

use super::client::{DockerClient, DockerError};
use super::inventory::ContainerInfo;
use super::stream::{LogChunk, LogStream, LogStreamRequest, StreamKind};

use bollard::container::LogOutput;
use bollard::models::ContainerInspectResponse;
use bollard::query_parameters::{ListContainersOptions, LogsOptions};
use futures_util::stream::StreamExt;

impl DockerClient {
    pub async fn list_containers(&self) -> Result<Vec<ContainerInfo>, DockerError> {
        let options = Some(ListContainersOptions {
            all: true,
            ..Default::default()
        });
        let containers = self.client.list_containers(options).await?;
        Ok(containers.into_iter().map(|c| c.into()).collect())
    }

    pub async fn inspect_container(&self, id: &str) -> Result<ContainerInfo, DockerError> {
        let details: ContainerInspectResponse = self.client
            .inspect_container(id, None)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError { status_code: 404, .. } => {
                    DockerError::ContainerNotFound(id.to_string())
                }
                other => DockerError::BollardError(other),
            })?;
        Ok(ContainerInfo::from(details))
    }

    /// Attach to a container's output. The request is sent lazily, on the
    /// first poll of the returned stream.
    pub async fn stream_logs(&self, request: LogStreamRequest) -> Result<LogStream, DockerError> {
        let options = LogsOptions {
            follow: request.follow,
            stdout: true,
            stderr: true,
            since: 0,
            until: 0,
            timestamps: false,
            tail: request.tail_param(),
        };

        let docker = self.client.clone();
        let container_id = request.container_id;

        let log_stream = async_stream::stream! {
            let mut output = docker.logs(&container_id, Some(options));
            while let Some(result) = output.next().await {
                yield match result {
                    Ok(frame) => Ok(convert_bollard_log(frame)),
                    Err(e) => Err(DockerError::from(e)),
                };
            }
        };

        Ok(LogStream::new(log_stream))
    }
}

/// Converts Bollard's `LogOutput` to our `LogChunk` format.
///
/// Only non-TTY containers are tailed, so frames arrive demultiplexed;
/// stdin/console frames are treated as stdout.
pub(crate) fn convert_bollard_log(output: LogOutput) -> LogChunk {
    let (stream, content) = match output {
        LogOutput::StdOut { message } => (StreamKind::Stdout, message),
        LogOutput::StdErr { message } => (StreamKind::Stderr, message),
        LogOutput::StdIn { message } => (StreamKind::Stdout, message),
        LogOutput::Console { message } => (StreamKind::Stdout, message),
    };

    LogChunk { stream, content }
}
