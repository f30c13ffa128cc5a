use std::net::SocketAddr;

use clap::Parser;
use swarmshare::app;
use swarmshare::bootstrap::{config, logging};

/// Runs the SwarmShare tracker.
#[derive(Parser, Debug)]
#[command(name = "swarmshare-tracker", version, about)]
struct Args {
    /// The address to listen on. It overrides `tracker.bind_address`.
    #[arg(long, env = "SWARMSHARE_TRACKER_BIND_ADDRESS")]
    bind_address: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut configuration = config::initialize_configuration()?;

    if let Some(bind_address) = args.bind_address {
        configuration.tracker.bind_address = bind_address;
    }

    logging::setup(&configuration);

    let (_container, server) = app::start_tracker(&configuration).await?;

    tracing::info!(address = %server.local_addr(), "tracker running, press Ctrl-C to stop");

    server.wait().await?;

    Ok(())
}
