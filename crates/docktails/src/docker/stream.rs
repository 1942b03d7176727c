use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_stream::Stream;
use crate::docker::client::DockerError;

// Cooperative yielding budget: a daemon can send long runs of empty frames
// (keep-alives, blank writes) which are skipped without returning to the
// executor otherwise.
const POLL_BUDGET: usize = 1024;

/// Which of the container's output streams a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStreamRequest {
    pub container_id: String,
    pub follow: bool,                    // tail -f mode
    pub tail_lines: Option<u32>,         // Like "docker logs --tail 100"; None = all
}

impl LogStreamRequest {
    /// Follow only output produced from now on (`--follow --tail 0`).
    ///
    /// Lifecycle events can arrive long after a container started, and a
    /// reconnect re-discovers every container, so replaying history would
    /// print the same lines again.
    pub fn follow_new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            follow: true,
            tail_lines: Some(0),
        }
    }

    /// Value for the daemon's `tail` query parameter.
    pub fn tail_param(&self) -> String {
        self.tail_lines
            .map(|n| n.to_string())
            .unwrap_or_else(|| "all".to_string())
    }
}

/// One demultiplexed frame of container output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogChunk {
    pub stream: StreamKind,
    pub content: bytes::Bytes,  // Memory-efficient
}

impl LogChunk {
    pub fn stdout(content: impl Into<bytes::Bytes>) -> Self {
        Self { stream: StreamKind::Stdout, content: content.into() }
    }

    pub fn stderr(content: impl Into<bytes::Bytes>) -> Self {
        Self { stream: StreamKind::Stderr, content: content.into() }
    }
}

pub struct LogStream {
    pub inner_stream: Pin<Box<dyn Stream<Item = Result<LogChunk, DockerError>> + Send>>,
}

impl LogStream {
    pub fn new(inner_stream: impl Stream<Item = Result<LogChunk, DockerError>> + Send + 'static) -> Self {
        Self {
            inner_stream: Box::pin(inner_stream),
        }
    }
}

impl Stream for LogStream {
    type Item = Result<LogChunk, DockerError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut budget = POLL_BUDGET;

        loop {
            if budget == 0 {
                cx.waker().wake_by_ref();
                return Poll::Pending;
            }
            budget -= 1;

            // Safe unpinning: LogStream is Unpin (all fields are Unpin)
            let this = self.as_mut().get_mut();

            match this.inner_stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) if chunk.content.is_empty() => continue,
                Poll::Ready(Some(result)) => return Poll::Ready(Some(result)),
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
