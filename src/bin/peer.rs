use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use swarmshare::app;
use swarmshare::bootstrap::{config, logging};
use swarmshare::console::Console;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Runs a SwarmShare peer agent with an interactive menu.
#[derive(Parser, Debug)]
#[command(name = "swarmshare-peer", version, about)]
struct Args {
    /// The tracker address, `host` or `host:port`. It is asked for when
    /// neither this option nor `peer.tracker_address` is set.
    #[arg(long, env = "SWARMSHARE_PEER_TRACKER")]
    tracker: Option<String>,

    /// The address the peer server listens on. It overrides
    /// `peer.bind_address`.
    #[arg(long)]
    bind_address: Option<SocketAddr>,

    /// The directory to advertise. It overrides `peer.content_dir`.
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// The directory for chunks pushed by other peers. It overrides
    /// `peer.storage_dir`.
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Do not watch the content directory.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut configuration = config::initialize_configuration()?;

    if let Some(bind_address) = args.bind_address {
        configuration.peer.bind_address = bind_address;
    }
    if let Some(content_dir) = args.content_dir {
        configuration.peer.content_dir = content_dir;
    }
    if let Some(storage_dir) = args.storage_dir {
        configuration.peer.storage_dir = storage_dir;
    }
    if args.no_watch {
        configuration.peer.watch = false;
    }

    logging::setup(&configuration);

    let mut input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();

    let tracker_address = match args.tracker.or_else(|| configuration.peer.tracker_address.clone()) {
        Some(tracker_address) => tracker_address,
        None => loop {
            output.write_all(b"Enter tracker IP: ").await?;
            output.flush().await?;

            let mut line = String::new();
            if input.read_line(&mut line).await? == 0 {
                return Ok(());
            }

            if !line.trim().is_empty() {
                break line.trim().to_string();
            }
        },
    };

    let agent = app::start_peer(&configuration, &tracker_address).await?;

    let mut console = Console::new(input, output);

    tokio::select! {
        result = console.run(&agent) => result?,
        result = tokio::signal::ctrl_c() => result?,
    }

    agent.stop().await?;

    Ok(())
}
