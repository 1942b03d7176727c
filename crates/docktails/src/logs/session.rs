//! Session — one container's log stream, prefixed onto the shared sinks.

use std::sync::Arc;

use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::client::DockerOps;
use crate::docker::inventory::{short_id, ContainerInfo};
use crate::docker::stream::{LogStreamRequest, StreamKind};
use crate::logs::registry::ClaimMode;
use crate::output::{make_prefix, PrefixWriter};
use crate::state::SharedState;

/// Running containers without a TTY. A TTY container's output arrives as one
/// raw stream that cannot be split into stdout and stderr.
pub fn is_tailable(container: &ContainerInfo) -> bool {
    container.running && !container.tty
}

/// Claim the container's slot and start a session task for it.
///
/// Returns `false` if the registry refused the claim: a live session from a
/// newer connection, or from this one when `mode` is [`ClaimMode::Keep`].
pub fn launch(
    state: &SharedState,
    client: &Arc<dyn DockerOps>,
    container_id: &str,
    generation: u64,
    mode: ClaimMode,
) -> bool {
    let Some(guard) = state.sessions.claim_with(container_id, generation, mode) else {
        debug!(container = %short_id(container_id), "already tailing, skipping");
        return false;
    };
    let serial = guard.serial();

    let task = tokio::spawn({
        let state = Arc::clone(state);
        let client = Arc::clone(client);
        let container_id = container_id.to_string();
        async move {
            let _guard = guard;
            run(client, container_id, state).await;
        }
    });
    state.sessions.attach(container_id, serial, task.abort_handle());
    true
}

/// Stream one container until its log stream ends or fails. Never retries.
pub async fn run(client: Arc<dyn DockerOps>, container_id: String, state: SharedState) {
    let short = short_id(&container_id);

    let container = match client.inspect_container(&container_id).await {
        Ok(container) => container,
        Err(e) => {
            warn!(container = %short, "failed to inspect container: {}", e);
            return;
        }
    };

    if !is_tailable(&container) {
        debug!(
            container = %short,
            state = %container.state,
            tty = container.tty,
            "not tailing container"
        );
        return;
    }

    let prefix = make_prefix(state.colors.next(), &container.name);
    let pretty = state.config.pretty_json;
    let stdout = PrefixWriter::new(state.stdout.clone(), prefix.clone(), pretty);
    let stderr = PrefixWriter::new(state.stderr.clone(), prefix, pretty);

    let mut stream = match client.stream_logs(LogStreamRequest::follow_new(container_id.as_str())).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(container = %short, "unable to start docker logs for {}: {}", container.image, e);
            return;
        }
    };

    info!(
        name = %container.name,
        "starting docker logs for {} {}",
        container.short_id(),
        container.image
    );

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => match chunk.stream {
                StreamKind::Stdout => stdout.write(&chunk.content).await,
                StreamKind::Stderr => stderr.write(&chunk.content).await,
            },
            Err(e) => {
                warn!(container = %short, "log stream failed: {}", e);
                return;
            }
        }
    }

    debug!(container = %short, "log stream ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::time::Duration;
    use tokio::sync::mpsc;

    use crate::client::fake::{FakeContainer, FakeDocker};
    use crate::conf::TailConfig;
    use crate::docker::stream::LogChunk;
    use crate::output::Color;
    use crate::output::SinkHandle;
    use crate::state::TailState;

    struct Harness {
        state: SharedState,
        fake: Arc<FakeDocker>,
        stdout: mpsc::Receiver<Bytes>,
        stderr: mpsc::Receiver<Bytes>,
    }

    impl Harness {
        fn new(pretty_json: bool) -> Self {
            let (out, stdout) = SinkHandle::channel();
            let (err, stderr) = SinkHandle::channel();
            let config = TailConfig { pretty_json, ..TailConfig::default() };
            Self {
                state: Arc::new(TailState::new(config, out, err)),
                fake: Arc::new(FakeDocker::new()),
                stdout,
                stderr,
            }
        }

        fn client(&self) -> Arc<dyn DockerOps> {
            self.fake.clone()
        }

        async fn run(&self, id: &str) {
            run(self.client(), id.to_string(), Arc::clone(&self.state)).await;
        }
    }

    fn info(running: bool, tty: bool) -> ContainerInfo {
        let mut container = if running {
            FakeContainer::running("abc123", "/web").info
        } else {
            FakeContainer::stopped("abc123", "/web").info
        };
        container.tty = tty;
        container
    }

    #[test]
    fn test_is_tailable() {
        assert!(is_tailable(&info(true, false)));
        assert!(!is_tailable(&info(false, false)));
        assert!(!is_tailable(&info(true, true)));
        assert!(!is_tailable(&info(false, true)));
    }

    #[tokio::test]
    async fn test_routes_stdout_and_stderr() {
        let mut h = Harness::new(false);
        h.fake
            .add_container(FakeContainer::running("abc123", "/web").with_logs(vec![
                LogChunk::stdout("hello\n"),
                LogChunk::stderr("oops\n"),
                LogChunk::stdout("bye\n"),
            ]))
            .await;

        h.run("abc123").await;

        let prefix = format!("{}web\x1b[0m  ", Color::GREEN);
        assert_eq!(h.stdout.recv().await.unwrap(), Bytes::from(format!("{prefix}hello\n")));
        assert_eq!(h.stdout.recv().await.unwrap(), Bytes::from(format!("{prefix}bye\n")));
        assert_eq!(h.stderr.recv().await.unwrap(), Bytes::from(format!("{prefix}oops\n")));
        assert!(h.stdout.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_requests_follow_from_now() {
        let h = Harness::new(true);
        h.fake.add_container(FakeContainer::running("abc123", "/web")).await;

        h.run("abc123").await;

        let requests = h.fake.log_requests().await;
        assert_eq!(requests.len(), 1);
        assert!(requests[0].follow);
        assert_eq!(requests[0].tail_param(), "0");
    }

    #[tokio::test]
    async fn test_ineligible_containers_never_stream() {
        let h = Harness::new(true);
        h.fake.add_container(FakeContainer::stopped("stopped1", "/db")).await;
        h.fake.add_container(FakeContainer::running("tty1", "/shell").with_tty()).await;

        h.run("stopped1").await;
        h.run("tty1").await;
        h.run("missing").await;

        assert!(h.fake.log_requests().await.is_empty());
        // No color consumed either.
        assert_eq!(h.state.colors.next(), Color::GREEN);
    }

    #[tokio::test]
    async fn test_json_is_pretty_printed() {
        let mut h = Harness::new(true);
        h.fake
            .add_container(
                FakeContainer::running("abc123", "/api").with_logs(vec![LogChunk::stdout("{\"a\":1}\n")]),
            )
            .await;

        h.run("abc123").await;

        let prefix = format!("{}api\x1b[0m  ", Color::GREEN);
        let out = h.stdout.recv().await.unwrap();
        assert_eq!(out, Bytes::from(format!("{prefix}{{\n{prefix}    \"a\": 1\n{prefix}}}\n")));
    }

    #[tokio::test]
    async fn test_launch_dedups_and_releases() {
        let h = Harness::new(true);
        h.fake.add_container(FakeContainer::running("abc123", "/web").keep_open()).await;
        let client = h.client();

        assert!(launch(&h.state, &client, "abc123", 1, ClaimMode::Keep));
        assert!(!launch(&h.state, &client, "abc123", 1, ClaimMode::Keep));

        // A newer connection supersedes the live session.
        assert!(launch(&h.state, &client, "abc123", 2, ClaimMode::Keep));
        assert_eq!(h.state.sessions.len(), 1);

        // A finished session frees its slot.
        h.fake.add_container(FakeContainer::running("def456", "/api")).await;
        assert!(launch(&h.state, &client, "def456", 2, ClaimMode::Keep));
        tokio::time::timeout(Duration::from_secs(5), async {
            while h.state.sessions.contains("def456") {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_restart_replaces_session_on_same_connection() {
        let h = Harness::new(true);
        h.fake.add_container(FakeContainer::running("abc123", "/web").keep_open()).await;
        let client = h.client();

        let wait_for = |n: usize| {
            let fake = h.fake.clone();
            async move {
                tokio::time::timeout(Duration::from_secs(5), async {
                    while fake.log_requests().await.len() < n {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                    }
                })
                .await
                .unwrap();
            }
        };

        assert!(launch(&h.state, &client, "abc123", 1, ClaimMode::Keep));
        wait_for(1).await;
        // The old follow stream has not closed yet when the restart lands.
        assert!(launch(&h.state, &client, "abc123", 1, ClaimMode::Replace));
        wait_for(2).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(h.fake.log_requests().await.len(), 2);
        assert_eq!(h.state.sessions.len(), 1);
        assert!(h.state.sessions.contains("abc123"));
    }
}
