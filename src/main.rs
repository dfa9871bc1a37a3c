// rigpause
//
// Watches Plex for new transcoding streams and pauses a NiceHash mining
// device for a while so the transcoder can start without contention.

mod clock;
mod config;
mod coordinator;
mod error;
mod monitor;
mod network;
mod pause;
mod rig;
mod session;
#[cfg(test)]
mod testing;
mod types;

use clap::Parser;
use clock::SystemClock;
use config::AppConfig;
use coordinator::{Coordinator, CoordinatorSettings};
use error::Result;
use rig::{NiceHashClient, RigStatusProbe, SysinfoProcessTable};
use session::{PlexClient, SessionTracker};
use std::path::PathBuf;
use std::process;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Monitor Plex for new transcoding streams and pause a NiceHash rig
/// while the transcoder starts up.
#[derive(Debug, Parser)]
#[command(name = "rigpause", version, about)]
struct Args {
    /// Config file (defaults to ./config.json, then the user config dir)
    #[arg(short, long, env = "RIGPAUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args) {
        tracing::error!("[Main] {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = AppConfig::load(args.config.as_deref())?;
    let timing = &config.timing;

    // Bound every request by the poll cadence
    let request_timeout = timing.poll_interval();

    let plex = PlexClient::new(&config.plex.api_url, &config.plex.token, request_timeout)?;
    let nicehash = NiceHashClient::new(
        &config.nicehash.api_url,
        &config.nicehash.organisation_id,
        &config.nicehash.api_key,
        &config.nicehash.api_secret,
        request_timeout,
    )?;

    let settings = CoordinatorSettings {
        poll_interval: timing.poll_interval(),
        pause_duration: timing.pause_duration(),
        rig_check_interval: timing.rig_check_interval(),
        device_name: config.nicehash.card_name.clone(),
        rig_id: config.nicehash.rig_id.clone(),
        process_name: config.nicehash.process_name.clone(),
    };

    tracing::info!(
        "[Main] Watching {} for transcodes, managing '{}' (pause {}s)",
        config.plex.api_url,
        settings.device_name,
        timing.pause_secs
    );

    let coordinator = Coordinator::start(
        SessionTracker::new(plex),
        RigStatusProbe::new(nicehash),
        SysinfoProcessTable::new(),
        SystemClock,
        settings,
    )?;

    coordinator.run()
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}
