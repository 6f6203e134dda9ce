use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use sysgauge::config::{self, Config};
use sysgauge::control::control_channel;
use sysgauge::monitor::Monitor;
use sysgauge::service;
use sysgauge::sink::ConsoleSink;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sysgauge",
    version,
    about = "Background CPU/memory monitor with a status-line indicator"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refresh rate in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Start with sampling disabled (enable later over the control channel)
    #[arg(long, default_value_t = false)]
    disabled: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    let tick_rate = Duration::from_millis(config.general.refresh_rate_ms);

    let (handle, controls) = control_channel();
    let mut monitor = Monitor::new(&config, Box::new(ConsoleSink::new()));

    // Mirrors the boot behavior: sampling only begins when the persisted
    // enabled flag says so. A failure to open the counter source surfaces
    // here, before the loop starts.
    if config.general.enabled {
        monitor.start()?;
    } else {
        info!("sampling disabled at startup");
    }

    let ctrl_c_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; shutting down");
            ctrl_c_handle.shutdown();
        }
    });

    service::run(monitor, controls, tick_rate).await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => config::load_config_from_path(path),
        None => config::load_config(),
    };

    if let Some(rate) = cli.refresh_rate {
        config.general.refresh_rate_ms = rate;
    }
    if cli.disabled {
        config.general.enabled = false;
    }

    config
}
