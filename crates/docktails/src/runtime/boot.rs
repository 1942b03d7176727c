//! Boot — logging init, config load, sink writers, state creation.

use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::client::{Connector, LiveConnector};
use crate::conf::TailConfig;
use crate::output::SinkHandle;
use crate::state::{SharedState, TailState};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialise the tracing / logging subsystem.
///
/// Diagnostics go to stderr so they never land inside the tailed stdout.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docktails=info,docker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load config, start the output writers and build shared state.
///
/// Returns the state and the connector the orchestrator should use.
pub fn boot(cli: &Cli) -> Result<(SharedState, Arc<dyn Connector>), Box<dyn std::error::Error>> {
    info!("starting version {}", VERSION);

    let mut config = TailConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!(
        "Configuration: pretty_json={}, prefix={:?}, retry={}s",
        config.pretty_json, config.name_prefix, config.retry_interval_secs
    );

    let connector: Arc<dyn Connector> = Arc::new(LiveConnector::new(config.endpoint()));

    // The writer tasks live as long as the runtime.
    let (stdout, _) = SinkHandle::stdout();
    let (stderr, _) = SinkHandle::stderr();

    let state = Arc::new(TailState::new(config, stdout, stderr));
    Ok((state, connector))
}
