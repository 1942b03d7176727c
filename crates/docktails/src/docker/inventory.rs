use bollard::models::{ContainerInspectResponse, ContainerSummary};

/// Length of the truncated id Docker shows in `docker ps`.
pub const SHORT_ID_LEN: usize = 12;

/// Truncate a container id to its display form. Ids shorter than
/// [`SHORT_ID_LEN`] are returned unchanged.
pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Read-only view of a container, built from either the list or the
/// inspect API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,          // Full container ID 64-char hash
    pub name: String,        // Without leading slash
    pub names: Vec<String>,  // Raw names as reported by the daemon ("/web-1")
    pub image: String,
    pub state: String,       // "running", "paused", "exited"
    pub running: bool,
    pub tty: bool,           // Only known from inspect; list reports false
}

impl ContainerInfo {
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

impl From<ContainerSummary> for ContainerInfo {
    fn from(s: ContainerSummary) -> Self {
        let names = s.names.unwrap_or_default();
        let state = s.state
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".into());

        Self {
            id: s.id.unwrap_or_default(),
            name: names.first()
                .map(|n| n.trim_start_matches('/'))
                .unwrap_or("unknown")
                .to_string(),
            names,
            image: s.image.unwrap_or_default(),
            running: state == "running",
            state,
            tty: false,
        }
    }
}

impl From<ContainerInspectResponse> for ContainerInfo {
    fn from(details: ContainerInspectResponse) -> Self {
        let raw_name = details.name.unwrap_or_default();

        // Config.Image is the reference the user asked for ("nginx:1.25");
        // the top-level Image is the resolved sha.
        let image = details.config
            .as_ref()
            .and_then(|c| c.image.clone())
            .or(details.image)
            .unwrap_or_default();

        let tty = details.config
            .as_ref()
            .and_then(|c| c.tty)
            .unwrap_or(false);

        let running = details.state
            .as_ref()
            .and_then(|s| s.running)
            .unwrap_or(false);

        let state = details.state
            .as_ref()
            .and_then(|s| s.status.as_ref())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".into());

        Self {
            id: details.id.unwrap_or_default(),
            name: if raw_name.is_empty() {
                "unknown".to_string()
            } else {
                raw_name.trim_start_matches('/').to_string()
            },
            names: if raw_name.is_empty() { Vec::new() } else { vec![raw_name] },
            image,
            state,
            running,
            tty,
        }
    }
}
