//! Centralized constants for the roadtrip-planner crate
//!
//! Values shared by the derivation code, the store and the sync gateway.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers
    pub const EARTH_RADIUS_KM: f64 = 6371.0;

    /// Latitude used for new days and map views without usable coordinates
    pub const FALLBACK_LAT: f64 = 46.5;

    /// Longitude used for new days and map views without usable coordinates
    pub const FALLBACK_LNG: f64 = 2.5;

    /// Half-width of the embedded map bounding box, in degrees longitude
    pub const EMBED_HALF_WIDTH_DEG: f64 = 0.08;

    /// Half-height of the embedded map bounding box, in degrees latitude
    pub const EMBED_HALF_HEIGHT_DEG: f64 = 0.05;
}

/// External map endpoints
pub mod maps {
    /// Generic Google Maps landing page
    pub const GOOGLE_MAPS_URL: &str = "https://www.google.com/maps";

    /// Google Maps directions API (deep link, no key required)
    pub const GOOGLE_DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/?api=1";

    /// OpenStreetMap base URL
    pub const OSM_URL: &str = "https://www.openstreetmap.org";

    /// OpenStreetMap embeddable tile view
    pub const OSM_EMBED_URL: &str = "https://www.openstreetmap.org/export/embed.html";
}

/// Local key-value storage keys
pub mod storage {
    /// Full trip document
    pub const TRIP_KEY: &str = "fr-roadtrip-v4";

    /// Per-user cloud settings blob
    pub const SYNC_SETTINGS_KEY: &str = "fr-roadtrip-cloud-v5";

    /// Id of the selected day
    pub const SELECTION_KEY: &str = "fr-roadtrip-selected";

    /// Authenticated remote session (tokens)
    pub const SESSION_KEY: &str = "fr-roadtrip-session";
}

/// Remote row store
pub mod remote {
    /// Table holding trip rows
    pub const TRIPS_TABLE: &str = "trips";

    /// Default debounce delay for auto-sync pushes, in milliseconds
    pub const AUTO_SYNC_DEBOUNCE_MS: u64 = 1200;

    /// Request timeout for remote calls, in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}
