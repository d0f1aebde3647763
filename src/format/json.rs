//! JSON output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::store::TripStore;

/// JSON formatter - outputs the export document (trip plus station snapshot)
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Export document with station snapshot"
    }

    fn format(&self, store: &TripStore) -> Result<String> {
        store.export_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::trip::Trip;
    use std::sync::Arc;

    #[test]
    fn test_json_format() {
        let store = TripStore::with_trip(Arc::new(MemoryStore::new()), Trip::bundled());
        let output = JsonFormatter.format(&store).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["trip_title"], "Südfrankreich Roadtrip");
        assert_eq!(value["days"].as_array().unwrap().len(), 7);
        assert_eq!(value["stations"][0]["name"], "Paris");
        assert_eq!(value["stations"][0]["nights"], "2 Nächte");
    }

    #[test]
    fn test_json_reimports_to_same_trip() {
        let store = TripStore::with_trip(Arc::new(MemoryStore::new()), Trip::bundled());
        let output = JsonFormatter.format(&store).unwrap();
        assert_eq!(Trip::from_json_str(&output).unwrap(), Trip::bundled());
    }
}
