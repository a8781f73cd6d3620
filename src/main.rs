//! Media Publisher CLI
//!
//! A command-line tool for publishing a movie/TV catalog export to
//! Kodi media servers.

use clap::Parser;
use media_publisher::cli::{
    args::{Cli, Commands},
    commands::{check, publish},
};
use media_publisher::models::config;

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // An explicit config path surfaces errors; the default location
    // falls back to defaults silently.
    let settings = match cli.config {
        Some(ref path) => config::load_settings_from(path)?,
        None => config::load_settings(),
    };

    match cli.command {
        Commands::Publish { export, output } => {
            publish::publish(&settings, export.as_deref(), output.as_deref())?;
        }
        Commands::Check => {
            check::check(&settings)?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("media_publisher=debug")
    } else {
        EnvFilter::new("media_publisher=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
