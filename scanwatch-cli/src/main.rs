//! Scanwatch CLI Entry Point

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scanwatch_cli::{commands, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging; `log` records from the library crates are bridged in
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    commands::execute(cli.command)
}
