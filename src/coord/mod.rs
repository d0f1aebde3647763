//! Geographic coordinates
//!
//! This module handles:
//! - The `[lat, lng]` pair stored on every day
//! - Great-circle distance between two pairs

pub mod distance;

use crate::constants::geo::{FALLBACK_LAT, FALLBACK_LNG};
use serde::{Deserialize, Serialize};

pub use distance::distance_km;

/// A geographic coordinate (latitude, longitude)
///
/// Serialized as a two-element array `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// The origin `(0, 0)`, used when stored coordinates are unusable
    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// The configured fallback for new days and map views
    pub fn fallback() -> Self {
        Self::new(FALLBACK_LAT, FALLBACK_LNG)
    }

    /// Both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Validate that coordinates are finite and within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.is_finite() {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "({}, {}) is not a finite coordinate pair",
                self.lat, self.lng
            )));
        }
        if self.lat < -90.0 || self.lat > 90.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if self.lng < -180.0 || self.lng > 180.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Format as `"lat,lng"` for map links
    pub fn to_pair_string(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(coords: Coordinates) -> Self {
        [coords.lat, coords.lng]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_pair() {
        let coords = Coordinates::new(48.85, 2.35);
        let json = serde_json::to_string(&coords).unwrap();
        assert_eq!(json, "[48.85,2.35]");

        let parsed: Coordinates = serde_json::from_str("[43.7,7.27]").unwrap();
        assert_eq!(parsed, Coordinates::new(43.7, 7.27));
    }

    #[test]
    fn test_validate() {
        assert!(Coordinates::new(48.85, 2.35).validate().is_ok());
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -181.0).validate().is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_pair_string() {
        assert_eq!(Coordinates::new(48.85, 2.35).to_pair_string(), "48.85,2.35");
        assert_eq!(Coordinates::fallback().to_pair_string(), "46.5,2.5");
        assert_eq!(Coordinates::zero().to_pair_string(), "0,0");
    }
}
