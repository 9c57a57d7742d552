use anyhow::Result;
use clap::{Parser, Subcommand};

use searoute_cli::commands::ports::{handle_nearest_port, NearestPortArgs};
use searoute_cli::commands::route::{handle_route, RouteArgs};
use searoute_cli::commands::vessels::handle_list_vessels;
use searoute_cli::logging::{init_logging, LogFormat};
use searoute_cli::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Weather-aware sea routing and port lookup")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a smoothed sea route between two positions or ports.
    Route(RouteArgs),
    /// Find the port closest to a position.
    NearestPort(NearestPortArgs),
    /// List vessel classes and their routing speeds.
    Vessels {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    init_logging(LogFormat::from_env());
    let cli = Cli::parse();

    match cli.command {
        Command::Route(args) => handle_route(&args),
        Command::NearestPort(args) => handle_nearest_port(&args),
        Command::Vessels { format } => handle_list_vessels(format),
    }
}
