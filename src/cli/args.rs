//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Media Publisher - Publish a catalog export to Kodi media servers
#[derive(Parser, Debug)]
#[command(name = "media-publisher")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the settings file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the publish pipeline over the catalog export
    Publish {
        /// Catalog export file (overrides the configured path)
        #[arg(value_name = "EXPORT")]
        export: Option<PathBuf>,

        /// Output directory for staging trees and scripts
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Validate the configuration and the export file
    Check,
}
