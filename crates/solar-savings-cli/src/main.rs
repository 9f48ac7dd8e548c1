mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::projection::ProjectArgs;
use commands::reference::{RegionsArgs, TrendsArgs};
use commands::sensitivity::SensitivityArgs;

/// Residential solar savings projections
#[derive(Parser)]
#[command(
    name = "solar-savings",
    version,
    about = "Residential solar savings projections",
    long_about = "Projects 25 years of net savings for a home solar system from its size, \
                  state, site quality, financing and local electricity prices. Also lists \
                  the regional productivity table and historical price trends."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Project yearly and cumulative net savings over 25 years
    Project(ProjectArgs),
    /// Sweep one or two inputs and tabulate total savings
    Sensitivity(SensitivityArgs),
    /// List regional productivity factors, or look up one code
    Regions(RegionsArgs),
    /// List site efficiency tiers
    SiteLevels,
    /// Historical electricity price and installed solar cost
    Trends(TrendsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::projection::run_project(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Regions(args) => commands::reference::run_regions(args),
        Commands::SiteLevels => commands::reference::run_site_levels(),
        Commands::Trends(args) => commands::reference::run_trends(args),
        Commands::Version => {
            println!("solar-savings {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
