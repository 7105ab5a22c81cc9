use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use trekplan::{TrekPlanConfig, telemetry, web};

#[derive(Parser)]
#[command(name = "trekplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TrekPlanConfig::load_from_path(cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _telemetry = telemetry::init(&config.logging, cli.verbose)?;
    info!("Starting trekplan {}", trekplan::VERSION);

    web::run(config).await
}
