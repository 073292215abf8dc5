//! Webpipe CLI - batch JPEG to WebP conversion with resize and resume.
//!
//! Converts every `.jpg` directly inside an input folder to WebP, fixing EXIF
//! orientation and resizing to a standard or custom resolution on the way.
//!
//! # Usage
//!
//! ```bash
//! # Convert a folder at the default resolution
//! webpipe convert ./photos ./webp
//!
//! # Custom size, snapped to the nearest configured aspect ratio
//! webpipe convert ./photos ./webp --width 1024 --height 768
//!
//! # Pick a resolution per image
//! webpipe convert ./photos ./webp --interactive
//!
//! # Lifetime statistics
//! webpipe stats
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Webpipe - batch JPEG to WebP converter with resize, orientation fix and resume.
#[derive(Parser, Debug)]
#[command(name = "webpipe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a directory of JPEG files to WebP
    Convert(cli::convert::ConvertArgs),

    /// Show or reset lifetime conversion statistics
    Stats(cli::stats::StatsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match webpipe_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `webpipe config path`."
            );
            webpipe_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Webpipe v{}", webpipe_core::VERSION);

    match cli.command {
        Commands::Convert(args) => cli::convert::execute(args, config).await,
        Commands::Stats(args) => cli::stats::execute(args, &config),
        Commands::Config(args) => cli::config::execute(args, &config),
    }
}
