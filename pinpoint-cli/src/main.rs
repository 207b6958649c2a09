//! Pinpoint CLI - pick a point on the map, get an address back.
//!
//! One-shot `reverse` and `search` commands talk to the configured
//! geocoding gateway directly; `pick` drives a full interactive picker
//! session from stdin; `config` manages the settings file.

mod commands;
mod error;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::pick::PickArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "pinpoint",
    version,
    about = "Pick a point on the map, get an address back"
)]
struct Cli {
    /// Enable debug logging for pinpoint modules
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve a coordinate pair to the nearest address
    Reverse {
        /// Latitude in decimal degrees
        lat: f64,
        /// Longitude in decimal degrees
        lon: f64,
    },

    /// Search for places matching a free-text query
    Search {
        /// Query text, e.g. "Chuy Avenue Bishkek"
        query: Vec<String>,
    },

    /// Run an interactive picker session on stdin
    Pick {
        /// Starting latitude (defaults to the configured initial location)
        #[arg(long, requires = "lon")]
        lat: Option<f64>,
        /// Starting longitude
        #[arg(long, requires = "lat")]
        lon: Option<f64>,
        /// Starting zoom level
        #[arg(long)]
        zoom: Option<f64>,
        /// Simulated device latitude for the locate command
        #[arg(long, requires = "device_lon")]
        device_lat: Option<f64>,
        /// Simulated device longitude for the locate command
        #[arg(long, requires = "device_lat")]
        device_lon: Option<f64>,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Interactive sessions log to a file, one-shot commands to stderr.
    let _guard = match &cli.command {
        Commands::Pick { .. } => Some(pinpoint::log::init_with_file(
            cli.verbose,
            &pinpoint::log::log_directory(),
        )?),
        _ => {
            pinpoint::log::init(cli.verbose)?;
            None
        }
    };

    match cli.command {
        Commands::Reverse { lat, lon } => commands::reverse::run(lat, lon).await,
        Commands::Search { query } => commands::search::run(&query.join(" ")).await,
        Commands::Pick {
            lat,
            lon,
            zoom,
            device_lat,
            device_lon,
        } => {
            commands::pick::run(PickArgs {
                lat,
                lon,
                zoom,
                device_lat,
                device_lon,
            })
            .await
        }
        Commands::Config { command } => commands::config::run(command),
    }
}
