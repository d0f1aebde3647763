//! Map deep links
//!
//! Generated links only; nothing here is fetched or parsed.

use crate::constants::geo::{EMBED_HALF_HEIGHT_DEG, EMBED_HALF_WIDTH_DEG};
use crate::constants::maps::{GOOGLE_DIRECTIONS_URL, GOOGLE_MAPS_URL, OSM_EMBED_URL, OSM_URL};
use crate::coord::Coordinates;
use crate::trip::Day;
use serde::Serialize;

/// Driving-directions deep link through every day, in order
///
/// Origin is the first day, destination the last, everything between is a
/// waypoint. With fewer than two days the generic map page is returned.
pub fn build_external_route_link(days: &[Day]) -> String {
    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return GOOGLE_MAPS_URL.to_string();
    };
    if days.len() < 2 {
        return GOOGLE_MAPS_URL.to_string();
    }

    let mut params = vec![
        ("origin", first.coordinates.to_pair_string()),
        ("destination", last.coordinates.to_pair_string()),
        ("travelmode", "driving".to_string()),
    ];

    let waypoints = days[1..days.len() - 1]
        .iter()
        .map(|d| d.coordinates.to_pair_string())
        .collect::<Vec<_>>()
        .join("|");
    if !waypoints.is_empty() {
        params.push(("waypoints", waypoints));
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}&{}", GOOGLE_DIRECTIONS_URL, query)
}

/// Links for the map panel of a single day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLinks {
    /// Embeddable OpenStreetMap tile view centered on the day
    pub embed_url: String,
    /// OpenStreetMap page with a marker
    pub osm_url: String,
    /// Google Maps search for the point
    pub google_url: String,
}

impl MapLinks {
    /// Links for a day; `None` falls back to the default map center
    pub fn for_day(day: Option<&Day>) -> Self {
        let coords = day
            .map(|d| d.coordinates)
            .filter(Coordinates::is_finite)
            .unwrap_or_else(Coordinates::fallback);
        Self::for_point(coords)
    }

    /// Links centered on a point
    pub fn for_point(coords: Coordinates) -> Self {
        let Coordinates { lat, lng } = coords;
        let bbox = [
            lng - EMBED_HALF_WIDTH_DEG,
            lat - EMBED_HALF_HEIGHT_DEG,
            lng + EMBED_HALF_WIDTH_DEG,
            lat + EMBED_HALF_HEIGHT_DEG,
        ]
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("%2C");

        Self {
            embed_url: format!(
                "{}?bbox={}&layer=mapnik&marker={}%2C{}",
                OSM_EMBED_URL, bbox, lat, lng
            ),
            osm_url: format!("{}/?mlat={}&mlon={}#map=12/{}/{}", OSM_URL, lat, lng, lat, lng),
            google_url: format!("{}?q={},{}", GOOGLE_MAPS_URL, lat, lng),
        }
    }
}
