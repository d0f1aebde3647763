//! Human-readable text output formatter

use crate::error::Result;
use crate::format::{format_eur, OutputFormatter};
use crate::route::{format_km, DIRECTIONS_NOTE};
use crate::store::TripStore;
use std::fmt::Write;

/// Text formatter - outputs the planner overview
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable itinerary"
    }

    fn format(&self, store: &TripStore) -> Result<String> {
        let trip = store.trip();
        let route = store.route();
        let mut out = String::new();

        // Header
        let _ = writeln!(out, "{}", trip.trip_title);
        if !trip.source.url.is_empty() {
            let label = if trip.source.title.is_empty() {
                &trip.source.url
            } else {
                &trip.source.title
            };
            let _ = writeln!(out, "Quelle: {} ({})", label, trip.source.url);
        }
        let _ = writeln!(
            out,
            "{} Tage, {}, {}",
            trip.days.len(),
            route.legs_label(),
            route.total_label()
        );

        // Days
        out.push_str("\nTage:\n");
        for (i, day) in trip.days.iter().enumerate() {
            let marker = if store.selected_id() == Some(day.id.as_str()) { '*' } else { ' ' };
            let _ = write!(out, "{} {:>2}. {}", marker, i + 1, day.title);
            if !day.location.is_empty() {
                let _ = write!(out, " ({})", day.location);
            }
            if !day.date.is_empty() {
                let _ = write!(out, " [{}]", day.date);
            }
            out.push('\n');
            for highlight in &day.highlights {
                let _ = writeln!(out, "       - {}", highlight);
            }
        }

        // Route
        if !route.legs.is_empty() {
            out.push_str("\nRoute:\n");
            for leg in &route.legs {
                let _ = writeln!(
                    out,
                    "  {} -> {}: {}",
                    leg.from_title,
                    leg.to_title,
                    format_km(leg.distance_km)
                );
            }
            let _ = writeln!(out, "  {}", route.total_label());
            let _ = writeln!(out, "  {}: {}", DIRECTIONS_NOTE, route.directions_url);
        }

        // Stations
        let stations = store.stations();
        if !stations.is_empty() {
            out.push_str("\nStationen:\n");
            for station in &stations {
                let _ = writeln!(out, "  {} ({})", station.name, station.nights_label());
            }
        }

        // Costs
        let costs = &trip.sections.costs;
        if !costs.items.is_empty() || costs.per_person_total_eur != 0.0 {
            out.push_str("\nKosten pro Person:\n");
            for item in &costs.items {
                let _ = writeln!(out, "  {}: {}", item.label, format_eur(item.value_eur));
            }
            let _ = writeln!(out, "  Gesamt: {}", format_eur(costs.per_person_total_eur));
            let _ = writeln!(out, "  Fixkosten: {}", format_eur(costs.per_person_fixed_eur));
            if let Some(note) = &costs.note {
                let _ = writeln!(out, "  {}", note);
            }
        }

        Ok(out)
    }
}
