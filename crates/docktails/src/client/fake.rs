//! Fake — test double for Docker operations.
//!
//! Provides a deterministic [`FakeDocker`] that implements [`DockerOps`]
//! using in-memory state, and a [`FakeConnector`] that hands out prepared
//! fakes so the reconnect cycle can run without a Docker daemon.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use crate::client::docker::{Connector, DockerOps, EventStream};
use crate::docker::client::DockerError;
use crate::docker::event::ContainerEvent;
use crate::docker::inventory::ContainerInfo;
use crate::docker::stream::{LogChunk, LogStream, LogStreamRequest};

// ── In-memory state ─────────────────────────────────────────────

/// A canned container for the fake store.
#[derive(Clone, Debug)]
pub struct FakeContainer {
    pub info: ContainerInfo,
    pub logs: Vec<LogChunk>,
    /// Keep the log stream open after the canned chunks, like `--follow`.
    pub keep_open: bool,
}

impl FakeContainer {
    fn build(id: &str, raw_name: &str, state: &str) -> Self {
        FakeContainer {
            info: ContainerInfo {
                id: id.to_string(),
                name: raw_name.trim_start_matches('/').to_string(),
                names: vec![raw_name.to_string()],
                image: "nginx:latest".to_string(),
                state: state.to_string(),
                running: state == "running",
                tty: false,
            },
            logs: Vec::new(),
            keep_open: false,
        }
    }

    pub fn running(id: &str, raw_name: &str) -> Self {
        Self::build(id, raw_name, "running")
    }

    pub fn stopped(id: &str, raw_name: &str) -> Self {
        Self::build(id, raw_name, "exited")
    }

    pub fn with_tty(mut self) -> Self {
        self.info.tty = true;
        self
    }

    pub fn with_logs(mut self, logs: Vec<LogChunk>) -> Self {
        self.logs = logs;
        self
    }

    pub fn keep_open(mut self) -> Self {
        self.keep_open = true;
        self
    }
}

/// Mutable inner state protected by a mutex.
#[derive(Default)]
struct Inner {
    containers: HashMap<String, FakeContainer>,
    ping_failures: usize,
    list_failures: usize,
    list_calls: usize,
    log_requests: Vec<LogStreamRequest>,
}

type EventSender = mpsc::UnboundedSender<Result<ContainerEvent, DockerError>>;
type EventReceiver = mpsc::UnboundedReceiver<Result<ContainerEvent, DockerError>>;

/// A fake Docker client for deterministic testing.
///
/// All methods operate on in-memory state. Events pushed with
/// [`FakeDocker::emit`] are delivered to the single event subscription;
/// [`FakeDocker::close_events`] ends it, like a daemon going away.
pub struct FakeDocker {
    inner: Mutex<Inner>,
    event_tx: std::sync::Mutex<Option<EventSender>>,
    event_rx: std::sync::Mutex<Option<EventReceiver>>,
}

impl FakeDocker {
    /// Create an empty fake Docker client.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inner: Mutex::new(Inner::default()),
            event_tx: std::sync::Mutex::new(Some(tx)),
            event_rx: std::sync::Mutex::new(Some(rx)),
        }
    }

    /// Seed a container into the fake store.
    pub async fn add_container(&self, container: FakeContainer) {
        let mut state = self.inner.lock().await;
        state.containers.insert(container.info.id.clone(), container);
    }

    /// Fail the next `n` pings.
    pub async fn fail_pings(&self, n: usize) {
        self.inner.lock().await.ping_failures = n;
    }

    /// Fail the next `n` container listings.
    pub async fn fail_lists(&self, n: usize) {
        self.inner.lock().await.list_failures = n;
    }

    /// Deliver an event to the subscriber (queued until there is one).
    pub fn emit(&self, event: ContainerEvent) {
        if let Ok(guard) = self.event_tx.lock() {
            if let Some(tx) = guard.as_ref() {
                let _ = tx.send(Ok(event));
            }
        }
    }

    /// Deliver a stream error to the subscriber.
    pub fn emit_error(&self, error: DockerError) {
        if let Ok(guard) = self.event_tx.lock() {
            if let Some(tx) = guard.as_ref() {
                let _ = tx.send(Err(error));
            }
        }
    }

    /// End the event stream once queued events are drained.
    pub fn close_events(&self) {
        if let Ok(mut guard) = self.event_tx.lock() {
            guard.take();
        }
    }

    /// Containers for which logs have been requested, in request order.
    pub async fn log_requests(&self) -> Vec<LogStreamRequest> {
        self.inner.lock().await.log_requests.clone()
    }

    pub async fn list_calls(&self) -> usize {
        self.inner.lock().await.list_calls
    }
}

impl Default for FakeDocker {
    fn default() -> Self {
        Self::new()
    }
}

// ── DockerOps implementation ────────────────────────────────────

impl DockerOps for FakeDocker {
    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), DockerError>> + Send + '_>> {
        Box::pin(async {
            let mut state = self.inner.lock().await;
            if state.ping_failures > 0 {
                state.ping_failures -= 1;
                return Err(DockerError::ConnectionFailed("ping refused".to_string()));
            }
            Ok(())
        })
    }

    fn list_containers(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ContainerInfo>, DockerError>> + Send + '_>> {
        Box::pin(async {
            let mut state = self.inner.lock().await;
            state.list_calls += 1;
            if state.list_failures > 0 {
                state.list_failures -= 1;
                return Err(DockerError::ConnectionFailed("list refused".to_string()));
            }
            let mut containers: Vec<ContainerInfo> =
                state.containers.values().map(|c| c.info.clone()).collect();
            containers.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(containers)
        })
    }

    fn inspect_container<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ContainerInfo, DockerError>> + Send + 'a>> {
        Box::pin(async move {
            let state = self.inner.lock().await;
            state.containers.get(id)
                .map(|c| c.info.clone())
                .ok_or_else(|| DockerError::ContainerNotFound(id.to_string()))
        })
    }

    fn stream_logs(
        &self,
        request: LogStreamRequest,
    ) -> Pin<Box<dyn Future<Output = Result<LogStream, DockerError>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            state.log_requests.push(request.clone());
            let container = state.containers.get(&request.container_id)
                .ok_or_else(|| DockerError::ContainerNotFound(request.container_id.clone()))?;

            let chunks: Vec<Result<LogChunk, DockerError>> =
                container.logs.iter().cloned().map(Ok).collect();
            let canned = tokio_stream::iter(chunks);

            if container.keep_open {
                let stream = canned.chain(tokio_stream::pending());
                Ok(LogStream::new(stream))
            } else {
                Ok(LogStream::new(canned))
            }
        })
    }

    fn stream_events(&self) -> EventStream {
        let rx = self.event_rx.lock().ok().and_then(|mut guard| guard.take());
        match rx {
            Some(rx) => Box::pin(UnboundedReceiverStream::new(rx)),
            // Only one subscription per fake; later ones end immediately.
            None => Box::pin(tokio_stream::empty()),
        }
    }
}

// ── Connector ───────────────────────────────────────────────────

/// Hands out prepared fakes in order; the last one is reused once the
/// queue is down to it.
pub struct FakeConnector {
    clients: std::sync::Mutex<VecDeque<Arc<FakeDocker>>>,
    failures: AtomicUsize,
    attempts: AtomicUsize,
}

impl FakeConnector {
    pub fn new(clients: Vec<Arc<FakeDocker>>) -> Self {
        Self {
            clients: std::sync::Mutex::new(clients.into()),
            failures: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Fail the first `n` connection attempts.
    pub fn with_failures(self, n: usize) -> Self {
        self.failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Connector for FakeConnector {
    fn connect(&self) -> Result<Arc<dyn DockerOps>, DockerError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(DockerError::ConnectionFailed("connection refused".to_string()));
        }

        let mut clients = self
            .clients
            .lock()
            .map_err(|_| DockerError::ConnectionFailed("connector poisoned".to_string()))?;
        let client = if clients.len() > 1 {
            clients.pop_front()
        } else {
            clients.front().cloned()
        };
        match client {
            Some(client) => Ok(client as Arc<dyn DockerOps>),
            None => Err(DockerError::ConnectionFailed("no fake clients left".to_string())),
        }
    }

    fn describe(&self) -> String {
        "fake docker host".to_string()
    }
}
