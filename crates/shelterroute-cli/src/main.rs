mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use shelterroute_cli::coords::{parse_distance, parse_point};
use shelterroute_cli::output::OutputFormat;
use shelterroute_lib::Point;

use commands::route::{ModeArg, PreferArg};
use commands::GlobalOptions;

#[derive(Parser, Debug)]
#[command(author, version, about = "Risk-aware evacuation and shelter routing")]
struct Cli {
    /// Directory holding site_navgraph.json, destinations.json and doors_auto.json.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON file overriding routing constants (exposure weight, thresholds, ...).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report that the site loaded, with node and edge counts.
    Health,
    /// Show site metadata (bounding box and graph size).
    Meta,
    /// Plain geometric shortest path between two positions.
    Shortest {
        /// Start position as X,Y in meters.
        #[arg(long = "from", value_parser = parse_point, allow_hyphen_values = true)]
        from: Point,
        /// Goal position as X,Y in meters.
        #[arg(long = "to", value_parser = parse_point, allow_hyphen_values = true)]
        to: Point,
    },
    /// Risk-aware route to the preferred destination kind, falling back to the other.
    Safe {
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        start: Point,
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        threat: Point,
        #[arg(long, value_enum)]
        prefer: Option<PreferArg>,
    },
    /// Risk-aware route constrained to pass through detected doors.
    Portal {
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        threat: Point,
        /// Defaults to the threat position.
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        start: Option<Point>,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Edges up to this length (meters) ignore the door constraint.
        #[arg(long, value_parser = parse_distance)]
        lshort: Option<f64>,
        /// Maximum distance (meters) from an edge midpoint to a door.
        #[arg(long = "door-thresh", value_parser = parse_distance)]
        door_thresh: Option<f64>,
    },
    /// Compare evacuation and shelter routes and pick the safer one.
    Auto {
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        start: Point,
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        threat: Point,
    },
    /// Reload and list the auto-detected doors.
    Doors,
    /// Inspect or replace the exit and shelter store.
    Destinations {
        #[command(subcommand)]
        action: DestinationsAction,
    },
}

#[derive(Subcommand, Debug)]
enum DestinationsAction {
    /// Print the current exits and shelters.
    List,
    /// Replace the store with the contents of a JSON file.
    Save {
        #[arg(long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let options = GlobalOptions {
        data_dir: cli.data_dir,
        config: cli.config,
        format: cli.format,
    };

    match cli.command {
        Command::Health => commands::site::handle_health(&options),
        Command::Meta => commands::site::handle_meta(&options),
        Command::Shortest { from, to } => commands::route::handle_shortest(&options, from, to),
        Command::Safe {
            start,
            threat,
            prefer,
        } => commands::route::handle_safe(&options, start, threat, prefer),
        Command::Portal {
            threat,
            start,
            mode,
            lshort,
            door_thresh,
        } => commands::route::handle_portal(
            &options,
            commands::route::PortalArgs {
                threat,
                start,
                mode,
                lshort,
                door_thresh,
            },
        ),
        Command::Auto { start, threat } => commands::route::handle_auto(&options, start, threat),
        Command::Doors => commands::site::handle_doors(&options),
        Command::Destinations { action } => match action {
            DestinationsAction::List => commands::destinations::handle_list(&options),
            DestinationsAction::Save { file } => {
                commands::destinations::handle_save(&options, &file)
            }
        },
    }
}

/// Logs go to stderr so `--format json` output on stdout stays parseable.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
