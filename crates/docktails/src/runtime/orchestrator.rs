//! Orchestrator — connect, tail what is already running, then follow
//! lifecycle events until the daemon goes away. Forever.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::Connector;
use crate::docker::event::EventKind;
use crate::docker::inventory::ContainerInfo;
use crate::logs::{launch, ClaimMode};
use crate::output::color::{BOLD, RESET};
use crate::runtime::connect::{Connection, ConnectionManager};
use crate::state::SharedState;

enum Phase {
    Connecting,
    Bootstrapping(Connection),
    Streaming(Connection),
}

pub struct Orchestrator {
    state: SharedState,
    connections: ConnectionManager,
    /// Bumped on every successful connection; sessions are claimed with it.
    generation: u64,
}

impl Orchestrator {
    pub fn new(state: SharedState, connector: Arc<dyn Connector>) -> Self {
        let retry_interval = state.config.retry_interval();
        Self {
            state,
            connections: ConnectionManager::new(connector, retry_interval),
            generation: 0,
        }
    }

    pub async fn run(mut self) {
        let mut phase = Phase::Connecting;
        loop {
            phase = self.step(phase).await;
        }
    }

    async fn step(&mut self, phase: Phase) -> Phase {
        match phase {
            Phase::Connecting => {
                let connection = self.connections.connect().await;
                self.generation += 1;
                Phase::Bootstrapping(connection)
            }
            Phase::Bootstrapping(connection) => {
                self.bootstrap(&connection).await;
                Phase::Streaming(connection)
            }
            Phase::Streaming(mut connection) => {
                self.follow_events(&mut connection).await;
                // At most one reconnect per retry interval.
                let wait = connection.remaining(self.connections.retry_interval());
                drop(connection);
                if !wait.is_zero() {
                    info!("event stream ended early; reconnecting in {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
                Phase::Connecting
            }
        }
    }

    /// Start a session for every matching container the daemon already has.
    async fn bootstrap(&self, connection: &Connection) {
        info!("getting container list...");
        let containers = self.list_until_ok(connection).await;

        if containers.is_empty() {
            info!("no containers running");
            return;
        }

        info!("starting logs");
        for container in containers.iter().filter(|c| self.state.filter.matches_container(c)) {
            launch(&self.state, &connection.client, &container.id, self.generation, ClaimMode::Keep);
        }
    }

    async fn list_until_ok(&self, connection: &Connection) -> Vec<ContainerInfo> {
        let retry = self.connections.retry_interval();
        loop {
            match connection.client.list_containers().await {
                Ok(containers) => return containers,
                Err(e) => {
                    warn!("Failed to list containers: {}; retrying in {:?}", e, retry);
                    tokio::time::sleep(retry).await;
                }
            }
        }
    }

    /// Consume lifecycle events until the stream ends or fails.
    async fn follow_events(&self, connection: &mut Connection) {
        while let Some(item) = connection.events.recv().await {
            let event = match item {
                Ok(event) => event,
                Err(e) => {
                    warn!("event stream failed: {}", e);
                    break;
                }
            };

            let short = event.short_id();
            info!(
                target: "docker",
                "event {}{}{} {} container={}",
                BOLD, event.kind, RESET, event.image, short
            );

            let container = match connection.client.inspect_container(&event.container_id).await {
                Ok(container) => container,
                Err(e) => {
                    warn!(container = %short, "failed to inspect container: {}", e);
                    continue;
                }
            };

            if event.kind == EventKind::Start && self.state.filter.matches_container(&container) {
                launch(
                    &self.state,
                    &connection.client,
                    &event.container_id,
                    self.generation,
                    ClaimMode::Replace,
                );
            } else {
                debug!(container = %short, kind = %event.kind, time = ?event.time, "ignoring event");
            }
        }

        warn!("event channel closed, probably lost connection to Docker host; retrying...");
    }
}
