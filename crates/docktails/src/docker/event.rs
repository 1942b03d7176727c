//! Event domain — container lifecycle events from the Docker engine.

use std::collections::HashMap;
use std::fmt;

use bollard::models::EventMessage;
use chrono::{DateTime, TimeZone, Utc};
use futures_util::stream::StreamExt;

use super::client::{DockerClient, DockerError};
use super::inventory::short_id;

/// What happened to a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Start,
    Stop,
    Die,
    Other(String),
}

impl From<&str> for EventKind {
    fn from(action: &str) -> Self {
        match action {
            "start" => EventKind::Start,
            "stop" => EventKind::Stop,
            "die" => EventKind::Die,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Start => "start",
            EventKind::Stop => "stop",
            EventKind::Die => "die",
            EventKind::Other(action) => action,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEvent {
    pub kind: EventKind,
    pub container_id: String,
    /// Image the container was created from (`from` in the legacy API).
    pub image: String,
    pub time: Option<DateTime<Utc>>,
}

impl ContainerEvent {
    pub fn new(kind: EventKind, container_id: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            kind,
            container_id: container_id.into(),
            image: image.into(),
            time: None,
        }
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.container_id)
    }

    /// Convert an engine event. Events without an actor id carry nothing to
    /// act on and are dropped.
    pub fn from_message(message: EventMessage) -> Option<Self> {
        let actor = message.actor?;
        let container_id = actor.id.filter(|id| !id.is_empty())?;
        let image = actor
            .attributes
            .as_ref()
            .and_then(|attrs| attrs.get("image").cloned())
            .unwrap_or_default();
        let time = message
            .time
            .and_then(|t| Utc.timestamp_opt(t, 0).single());

        Some(Self {
            kind: EventKind::from(message.action.as_deref().unwrap_or_default()),
            container_id,
            image,
            time,
        })
    }
}

impl DockerClient {
    /// Subscribe to container lifecycle events.
    ///
    /// The returned stream owns a handle to the client, so it outlives the
    /// borrow of `self`. It ends when the daemon closes the connection.
    pub fn stream_events(
        &self,
    ) -> impl futures_util::Stream<Item = Result<ContainerEvent, DockerError>> + Send + 'static {
        use bollard::query_parameters::EventsOptionsBuilder;

        let docker = self.client.clone();

        async_stream::stream! {
            let mut filters = HashMap::new();
            filters.insert("type", vec!["container"]);
            let options = EventsOptionsBuilder::default().filters(&filters).build();

            let mut events = docker.events(Some(options));
            while let Some(item) = events.next().await {
                match item {
                    Ok(message) => {
                        if let Some(event) = ContainerEvent::from_message(message) {
                            yield Ok(event);
                        }
                    }
                    Err(e) => {
                        yield Err(DockerError::from(e));
                        break;
                    }
                }
            }
        }
    }
}
