//! URL output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::route::build_external_route_link;
use crate::store::TripStore;

/// URL formatter - outputs a driving-directions deep link through all days
pub struct UrlFormatter;

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Google Maps directions link"
    }

    fn format(&self, store: &TripStore) -> Result<String> {
        Ok(build_external_route_link(&store.trip().days))
    }
}
