//! rudder-netconfig - pushes the computed network configuration into the
//! kernel. Meant to be invoked by the supervising process whenever the
//! configuration under `--dir` changes.

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Apply computed router network configuration.
#[derive(Parser)]
#[command(name = "rudder-netconfig")]
#[command(version = VERSION)]
struct Args {
    /// Uplink interface name the lease appliers target
    #[arg(long, default_value = "uplink0")]
    interface: String,

    /// Configuration directory holding interfaces.json and the lease files
    #[arg(long, default_value = "/perm")]
    dir: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();

    info!(
        "rudder-netconfig v{} applying {} (uplink {})",
        VERSION,
        args.dir.display(),
        args.interface
    );

    rudder_netconfig::apply(&args.interface, &args.dir).await?;

    info!("network configuration applied");
    Ok(())
}
