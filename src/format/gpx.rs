//! GPX output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::store::TripStore;

/// GPX formatter - one waypoint per day plus a route through all of them
pub struct GpxFormatter;

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoints and route"
    }

    fn format(&self, store: &TripStore) -> Result<String> {
        let trip = store.trip();
        let mut gpx = String::new();

        // XML header
        gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        gpx.push('\n');
        gpx.push_str(r#"<gpx version="1.1" creator="roadtrip-planner">"#);
        gpx.push('\n');

        // Metadata
        gpx.push_str("  <metadata>\n");
        gpx.push_str(&format!("    <name>{}</name>\n", escape(&trip.trip_title)));
        if !trip.source.url.is_empty() {
            gpx.push_str(&format!(r#"    <link href="{}"/>"#, escape(&trip.source.url)));
            gpx.push('\n');
        }
        gpx.push_str("  </metadata>\n");

        // Day waypoints
        for day in &trip.days {
            gpx.push_str(&format!(
                r#"  <wpt lat="{}" lon="{}">"#,
                day.coordinates.lat, day.coordinates.lng
            ));
            gpx.push('\n');
            gpx.push_str(&format!("    <name>{}</name>\n", escape(&day.title)));
            if !day.location.is_empty() {
                gpx.push_str(&format!("    <desc>{}</desc>\n", escape(&day.location)));
            }
            gpx.push_str("  </wpt>\n");
        }

        // Route in trip order
        if trip.days.len() >= 2 {
            gpx.push_str("  <rte>\n");
            gpx.push_str(&format!("    <name>{}</name>\n", escape(&trip.trip_title)));
            for day in &trip.days {
                gpx.push_str(&format!(
                    r#"    <rtept lat="{}" lon="{}"><name>{}</name></rtept>"#,
                    day.coordinates.lat,
                    day.coordinates.lng,
                    escape(day.effective_name())
                ));
                gpx.push('\n');
            }
            gpx.push_str("  </rte>\n");
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
