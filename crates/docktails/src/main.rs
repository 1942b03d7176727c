use docktails::cli::Cli;
use docktails::runtime::{boot, stop, Orchestrator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();
    boot::init_logging();
    let (state, connector) = boot::boot(&cli)?;

    tokio::select! {
        _ = Orchestrator::new(state, connector).run() => {},
        _ = stop::shutdown_signal() => {},
    }
    Ok(())
}
