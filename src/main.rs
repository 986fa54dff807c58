// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use photobooth::backends::camera::types::FacingMode;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Photo booth capture-and-composite pipeline")]
#[command(version = photobooth::constants::app_info::version())]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a photo
    Capture {
        /// Camera facing mode: front or back
        #[arg(short, long)]
        facing: Option<FacingMode>,

        /// Brightness in [0, 1] (default: configured value)
        #[arg(short, long)]
        brightness: Option<f32>,

        /// Displayed container width the capture should reproduce
        #[arg(long, requires = "height")]
        width: Option<f32>,

        /// Displayed container height the capture should reproduce
        #[arg(long, requires = "width")]
        height: Option<f32>,

        /// Output directory (default: configured save folder)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List stored photos, newest first
    List,

    /// Delete one photo by id
    Delete {
        /// Photo id (from 'photobooth list')
        id: u64,
    },

    /// Delete all stored photos
    Clear,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photobooth=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Capture {
            facing,
            brightness,
            width,
            height,
            output,
        } => cli::capture(facing, brightness, width, height, output),
        Commands::List => cli::list(),
        Commands::Delete { id } => cli::delete(id),
        Commands::Clear => cli::clear(),
    }
}
