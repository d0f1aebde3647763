//! Trip-level command handlers
//!
//! Viewing, title, import/export and reset.

use crate::cli::{open_planner, resolve_day};
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::planner::Planner;
use crate::route::{format_km, DIRECTIONS_NOTE};
use crate::store::Command;
use clap::Args;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

/// Show command arguments
#[derive(Args)]
pub struct ShowArgs {
    /// Output format (json, text, gpx, url)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,
}

/// Title command arguments
#[derive(Args)]
pub struct TitleArgs {
    /// New trip title
    pub title: String,
}

/// Route command arguments
#[derive(Args)]
pub struct RouteArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Stations command arguments
#[derive(Args)]
pub struct StationsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Map command arguments
#[derive(Args)]
pub struct MapArgs {
    /// Day position (1-based) or id; defaults to the selected day
    pub day: Option<String>,
}

/// Import command arguments
#[derive(Args)]
pub struct ImportArgs {
    /// JSON file to import ("-" reads stdin)
    pub file: PathBuf,
}

/// Export command arguments
#[derive(Args)]
pub struct ExportArgs {
    /// Output format (json, text, gpx, url)
    #[arg(long, short = 'f', default_value = "json")]
    pub format: String,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Print the itinerary
pub fn show(args: ShowArgs) -> Result<()> {
    let planner = open_planner()?;
    print!("{}", render(&planner, &args.format)?);
    Ok(())
}

/// Set the trip title
pub async fn title(args: TitleArgs) -> Result<()> {
    let mut planner = open_planner()?;
    planner.dispatch(Command::SetTitle {
        title: args.title.clone(),
    })?;
    planner.flush().await;
    println!("Title: {}", args.title);
    Ok(())
}

/// Print route legs and the total distance
pub fn route(args: RouteArgs) -> Result<()> {
    let planner = open_planner()?;
    let route = planner.store().route();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&route)?);
        return Ok(());
    }

    if route.legs.is_empty() {
        println!("No legs (fewer than two days).");
    }
    for leg in &route.legs {
        println!(
            "  {:>2}. {} -> {}  {}",
            leg.index + 1,
            leg.from_title,
            leg.to_title,
            format_km(leg.distance_km)
        );
    }
    println!("\n{}, {}", route.legs_label(), route.total_label());
    println!("{}:\n{}", DIRECTIONS_NOTE, route.directions_url);
    Ok(())
}

/// Print the derived stations
pub fn stations(args: StationsArgs) -> Result<()> {
    let planner = open_planner()?;
    let stations = planner.store().stations();

    if args.json {
        let snapshots: Vec<_> = stations.iter().map(|s| s.snapshot()).collect();
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }

    for station in &stations {
        println!(
            "  {} ({}) at {}",
            station.name,
            station.nights_label(),
            station.coordinates.to_pair_string()
        );
    }
    Ok(())
}

/// Print map links for a day
pub fn map(args: MapArgs) -> Result<()> {
    let planner = open_planner()?;
    let day_id = args
        .day
        .as_deref()
        .map(|reference| resolve_day(planner.trip(), reference))
        .transpose()?;

    let links = planner.map_links(day_id.as_deref())?;
    println!("Embed:  {}", links.embed_url);
    println!("OSM:    {}", links.osm_url);
    println!("Google: {}", links.google_url);
    Ok(())
}

/// Replace the trip from a JSON file
pub async fn import(args: ImportArgs) -> Result<()> {
    let text = if args.file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&args.file)?
    };

    let mut planner = open_planner()?;
    planner.dispatch(Command::Import { json: text })?;
    planner.flush().await;
    println!(
        "Imported \"{}\" ({} days)",
        planner.trip().trip_title,
        planner.trip().days.len()
    );
    Ok(())
}

/// Write the trip in the requested format
pub fn export(args: ExportArgs) -> Result<()> {
    let planner = open_planner()?;
    let output = render(&planner, &args.format)?;

    match args.output {
        Some(path) => {
            fs::write(&path, output)?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}

/// Restore the bundled trip
pub async fn reset() -> Result<()> {
    let mut planner = open_planner()?;
    planner.dispatch(Command::Reset)?;
    planner.flush().await;
    println!("Reset to \"{}\"", planner.trip().trip_title);
    Ok(())
}

fn render(planner: &Planner, format: &str) -> Result<String> {
    let formatter = get_formatter(format).ok_or_else(|| {
        let names: Vec<String> = available_formats().into_iter().map(|f| f.name).collect();
        Error::Config(format!(
            "Unknown format: {} (available: {})",
            format,
            names.join(", ")
        ))
    })?;

    let mut output = formatter.format(planner.store())?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}
