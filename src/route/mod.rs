//! Route derivation
//!
//! Turns the ordered day list into straight-line legs. Recomputed from
//! scratch on every read; nothing here is stored.

pub mod link;

use crate::coord::distance_km;
use crate::trip::Day;
use serde::Serialize;

pub use link::{build_external_route_link, MapLinks};

/// Caption for the directions link; the legs are straight lines, the link is not
pub const DIRECTIONS_NOTE: &str = "Google Maps Route (Vorschlag, Strecke weicht von der Luftlinie ab)";

/// Straight-line segment between two consecutive days
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    /// Position of the origin day in trip order
    pub index: usize,
    pub from_id: String,
    pub to_id: String,
    pub from_title: String,
    pub to_title: String,
    pub from_location: String,
    pub to_location: String,
    pub distance_km: f64,
}

/// Legs plus their total, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub legs: Vec<Leg>,
    pub total_km: f64,
    /// Directions deep link (advisory, does not match the straight-line legs)
    pub directions_url: String,
}

impl RouteSummary {
    /// Derive the full route for a day list
    pub fn from_days(days: &[Day]) -> Self {
        let legs = build_legs(days);
        let total_km = total_distance(&legs);
        Self {
            legs,
            total_km,
            directions_url: build_external_route_link(days),
        }
    }

    /// `"{n} Etappen"` label for the planner header
    pub fn legs_label(&self) -> String {
        format!("{} Etappen", self.legs.len())
    }

    /// `"Gesamt: {km} (Luftlinie)"`
    pub fn total_label(&self) -> String {
        format!("Gesamt: {} (Luftlinie)", format_km(self.total_km))
    }
}

/// One leg per adjacent pair of days, in day order
///
/// Always `max(0, days.len() - 1)` legs.
pub fn build_legs(days: &[Day]) -> Vec<Leg> {
    days.windows(2)
        .enumerate()
        .map(|(index, pair)| {
            let (from, to) = (&pair[0], &pair[1]);
            Leg {
                index,
                from_id: from.id.clone(),
                to_id: to.id.clone(),
                from_title: from.title.clone(),
                to_title: to.title.clone(),
                from_location: from.location.clone(),
                to_location: to.location.clone(),
                distance_km: distance_km(from.coordinates, to.coordinates),
            }
        })
        .collect()
}

/// Sum of leg distances (0 with no legs)
pub fn total_distance(legs: &[Leg]) -> f64 {
    // f64's `Sum` starts at -0.0
    legs.iter().fold(0.0, |total, leg| total + leg.distance_km)
}

/// Whole kilometers, e.g. `"683 km"`
pub fn format_km(km: f64) -> String {
    let km = if km.is_finite() { km } else { 0.0 };
    format!("{:.0} km", km)
}
