//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod day;
pub mod serve;
pub mod sync;
pub mod trip;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::planner::Planner;
use crate::trip::Trip;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Road trip itinerary planner
#[derive(Parser)]
#[command(name = "roadtrip-planner")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log to stderr (RUST_LOG overrides the level)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the itinerary
    Show(trip::ShowArgs),

    /// Add, edit, reorder and delete days
    Day(day::DayArgs),

    /// Add or remove day highlights
    Highlight(day::HighlightArgs),

    /// Set the trip title
    Title(trip::TitleArgs),

    /// Show the route legs and total distance
    Route(trip::RouteArgs),

    /// Show the derived overnight stations
    Stations(trip::StationsArgs),

    /// Show map links for a day
    Map(trip::MapArgs),

    /// Replace the trip with a JSON document
    Import(trip::ImportArgs),

    /// Write the trip in one of the output formats
    Export(trip::ExportArgs),

    /// Discard local changes and restore the bundled trip
    Reset,

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Remote sync and account
    Sync(sync::SyncArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        init_logging("debug");
    }

    match cli.command {
        Commands::Show(args) => trip::show(args),
        Commands::Day(args) => day::run(args).await,
        Commands::Highlight(args) => day::run_highlight(args).await,
        Commands::Title(args) => trip::title(args).await,
        Commands::Route(args) => trip::route(args),
        Commands::Stations(args) => trip::stations(args),
        Commands::Map(args) => trip::map(args),
        Commands::Import(args) => trip::import(args).await,
        Commands::Export(args) => trip::export(args),
        Commands::Reset => trip::reset().await,
        Commands::Config(args) => config::run(args),
        Commands::Sync(args) => sync::run(args).await,
        Commands::Serve(args) => serve::run(args, cli.verbose).await,
    }
}

/// Install the tracing subscriber (`RUST_LOG` wins over `default_level`)
pub fn init_logging(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .try_init();
}

/// Load config and open the planner on it
pub fn open_planner() -> Result<Planner> {
    let config = Config::load()?;
    Planner::open(&config)
}

/// Resolve a day reference: 1-based position, exact id, or unique id prefix
pub fn resolve_day(trip: &Trip, reference: &str) -> Result<String> {
    let reference = reference.trim();

    if let Ok(position) = reference.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|i| trip.days.get(i))
            .map(|d| d.id.clone())
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "day {} (trip has {} days)",
                    position,
                    trip.days.len()
                ))
            });
    }

    if let Some(day) = trip.day(reference) {
        return Ok(day.id.clone());
    }

    let matches: Vec<&str> = trip
        .days
        .iter()
        .map(|d| d.id.as_str())
        .filter(|id| !reference.is_empty() && id.starts_with(reference))
        .collect();

    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(Error::NotFound(format!("day {}", reference))),
        _ => Err(Error::NotFound(format!(
            "day {} is ambiguous ({} matches)",
            reference,
            matches.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_position() {
        let trip = Trip::bundled();
        assert_eq!(resolve_day(&trip, "1").unwrap(), "day-paris-1");
        assert_eq!(resolve_day(&trip, "7").unwrap(), "day-nice-1");
        assert!(resolve_day(&trip, "0").is_err());
        assert!(resolve_day(&trip, "8").is_err());
    }

    #[test]
    fn test_resolve_by_id() {
        let trip = Trip::bundled();
        assert_eq!(resolve_day(&trip, "day-lyon-1").unwrap(), "day-lyon-1");
        assert_eq!(resolve_day(&trip, "day-ly").unwrap(), "day-lyon-1");
    }

    #[test]
    fn test_resolve_ambiguous_prefix() {
        let trip = Trip::bundled();
        let err = resolve_day(&trip, "day-paris").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
        assert!(resolve_day(&trip, "").is_err());
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from(["roadtrip-planner", "day", "edit", "2", "--lat", "45.1"]).unwrap();
        assert!(matches!(cli.command, Commands::Day(_)));

        let cli = Cli::try_parse_from(["roadtrip-planner", "-v", "sync", "auto", "on"]).unwrap();
        assert!(cli.verbose);
    }
}
