//! Output formatters
//!
//! Provides trait-based output formatting for the itinerary.

pub mod gpx;
pub mod json;
pub mod text;
pub mod url;

use crate::error::Result;
use crate::store::TripStore;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Render the current trip, including derived route and stations
    fn format(&self, store: &TripStore) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "gpx" => Some(Box::new(gpx::GpxFormatter)),
        "url" => Some(Box::new(url::UrlFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    ["json", "text", "gpx", "url"]
        .iter()
        .filter_map(|name| get_formatter(name))
        .map(|f| FormatInfo {
            name: f.name().to_string(),
            description: f.description().to_string(),
        })
        .collect()
}

/// Euro amount in German notation, e.g. `1.234,50 €`
pub fn format_eur(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let total_cents = (value.abs() * 100.0).round() as u64;
    let (euros, cents) = (total_cents / 100, total_cents % 100);

    let digits = euros.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && total_cents > 0 { "-" } else { "" };
    format!("{}{},{:02} €", sign, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::trip::Trip;
    use std::sync::Arc;

    #[test]
    fn test_lookup_by_name() {
        for name in ["json", "Text", "GPX", "url"] {
            let formatter = get_formatter(name).unwrap();
            assert_eq!(formatter.name(), name.to_lowercase());
        }
        assert!(get_formatter("kml").is_none());
    }

    #[test]
    fn test_every_format_renders_bundled_trip() {
        let store = TripStore::with_trip(Arc::new(MemoryStore::new()), Trip::bundled());
        let formats = available_formats();
        assert_eq!(formats.len(), 4);

        for info in formats {
            let out = get_formatter(&info.name).unwrap().format(&store).unwrap();
            assert!(!out.trim().is_empty(), "{} rendered nothing", info.name);
            assert!(!info.description.is_empty());
        }
    }

    #[test]
    fn test_format_eur() {
        assert_eq!(format_eur(1234.5), "1.234,50 €");
        assert_eq!(format_eur(0.0), "0,00 €");
        assert_eq!(format_eur(999.999), "1.000,00 €");
        assert_eq!(format_eur(1_480_000.0), "1.480.000,00 €");
        assert_eq!(format_eur(-12.3), "-12,30 €");
        assert_eq!(format_eur(f64::NAN), "0,00 €");
    }
}
