//! Connect — keep trying until a Docker daemon answers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{info, warn};

use crate::client::{Connector, DockerOps};
use crate::docker::client::DockerError;
use crate::docker::event::ContainerEvent;

pub type EventReceiver = mpsc::UnboundedReceiver<Result<ContainerEvent, DockerError>>;

/// A live client plus its event subscription.
///
/// Events are pulled from the daemon as soon as the connection is up, so
/// starts that happen while containers are being listed are queued rather
/// than lost.
pub struct Connection {
    pub client: Arc<dyn DockerOps>,
    pub events: EventReceiver,
    opened_at: Instant,
    forwarder: JoinHandle<()>,
}

impl Connection {
    pub fn open(client: Arc<dyn DockerOps>) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let mut stream = client.stream_events();

        let forwarder = tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                if tx.send(item).is_err() {
                    break;
                }
            }
        });

        Self { client, events, opened_at: Instant::now(), forwarder }
    }

    /// Time left before `interval` has passed since the connection opened.
    pub fn remaining(&self, interval: Duration) -> Duration {
        interval.saturating_sub(self.opened_at.elapsed())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    retry_interval: Duration,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>, retry_interval: Duration) -> Self {
        Self { connector, retry_interval }
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    /// Connect, ping and subscribe to events. Retries forever.
    pub async fn connect(&self) -> Connection {
        let target = self.connector.describe();
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            info!("Connecting to Docker at {} (attempt {})", target, attempt);

            match self.connector.connect() {
                Ok(client) => match client.ping().await {
                    Ok(()) => {
                        info!("✓ Connected to Docker at {}", target);
                        return Connection::open(client);
                    }
                    Err(e) => {
                        warn!(
                            "Docker at {} did not answer ping: {}; retrying in {:?}",
                            target, e, self.retry_interval
                        );
                    }
                },
                Err(e) => {
                    warn!(
                        "Failed to connect to Docker at {}: {}; retrying in {:?}",
                        target, e, self.retry_interval
                    );
                }
            }

            tokio::time::sleep(self.retry_interval).await;
        }
    }
}
