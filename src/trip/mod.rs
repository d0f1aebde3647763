//! Trip document model
//!
//! The trip is the single mutable source of truth: an ordered list of days
//! plus the free-form sections shown in the public view. Route legs and
//! stations are never stored here; they are derived on demand.
//!
//! Deserialization is deliberately forgiving (see [`lenient`]): missing or
//! wrong-typed fields fall back to defaults instead of rejecting the
//! document, so older or hand-edited exports keep loading.

pub mod lenient;

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Title used when a document carries none
pub const DEFAULT_TRIP_TITLE: &str = "Frankreich Roadtrip";

/// Title given to days created from the planner
pub const NEW_DAY_TITLE: &str = "Neuer Tag";

/// Bundled default document, used on first run and after a reset
pub const BUNDLED_TRIP: &str = include_str!("../../data/default_trip.json");

/// Generate a new day id
///
/// Random hex plus a millisecond timestamp; unique for the lifetime of the
/// process, not cryptographically strong.
pub fn new_day_id() -> String {
    let random: u64 = rand::thread_rng().gen();
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("day-{:x}-{:x}", random, millis)
}

/// One itinerary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    #[serde(default = "new_day_id", deserialize_with = "lenient::day_id")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,

    /// Free text, not parsed
    #[serde(default, deserialize_with = "lenient::string")]
    pub date: String,

    /// Drives station grouping
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,

    #[serde(default, deserialize_with = "lenient::strings")]
    pub highlights: Vec<String>,

    /// Image URL, possibly empty
    #[serde(default, deserialize_with = "lenient::string")]
    pub image: String,

    #[serde(default, deserialize_with = "lenient::coordinates")]
    pub coordinates: Coordinates,
}

impl Day {
    /// Create an empty day with a fresh id
    pub fn new(title: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            id: new_day_id(),
            title: title.into(),
            date: String::new(),
            location: String::new(),
            description: String::new(),
            highlights: Vec::new(),
            image: String::new(),
            coordinates,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the image URL
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Name used to group this day into a station
    ///
    /// Trimmed location, else the title, else `"Station"`.
    pub fn effective_name(&self) -> &str {
        let location = self.location.trim();
        if !location.is_empty() {
            location
        } else if !self.title.is_empty() {
            &self.title
        } else {
            "Station"
        }
    }
}

/// Where the itinerary was adapted from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
}

/// One line of the cost overview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    #[serde(default, deserialize_with = "lenient::string")]
    pub label: String,

    #[serde(default, deserialize_with = "lenient::number")]
    pub value_eur: f64,
}

/// Cost overview per person
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Costs {
    #[serde(default, deserialize_with = "lenient::objects")]
    pub items: Vec<CostItem>,

    #[serde(default, deserialize_with = "lenient::number")]
    pub per_person_total_eur: f64,

    #[serde(default, deserialize_with = "lenient::number")]
    pub per_person_fixed_eur: f64,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_string"
    )]
    pub note: Option<String>,
}

/// Free-form sections of the public view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sections {
    #[serde(default, deserialize_with = "lenient::strings")]
    pub book_ahead: Vec<String>,

    #[serde(default, deserialize_with = "lenient::strings")]
    pub tips: Vec<String>,

    #[serde(default, deserialize_with = "lenient::object")]
    pub costs: Costs,
}

/// The whole trip document
///
/// A `stations` array in the input is ignored: stations are regenerated
/// from `days` on every read and only written out as an export snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    #[serde(default = "default_trip_title", deserialize_with = "lenient::title")]
    pub trip_title: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub hero_image: String,

    #[serde(default, deserialize_with = "lenient::object")]
    pub source: Source,

    /// Authoritative trip order
    #[serde(default, deserialize_with = "lenient::objects")]
    pub days: Vec<Day>,

    #[serde(default, deserialize_with = "lenient::object")]
    pub sections: Sections,
}

fn default_trip_title() -> String {
    DEFAULT_TRIP_TITLE.to_string()
}

impl Default for Trip {
    fn default() -> Self {
        Self {
            trip_title: default_trip_title(),
            hero_image: String::new(),
            source: Source::default(),
            days: Vec::new(),
            sections: Sections::default(),
        }
    }
}

impl Trip {
    /// Normalize an arbitrary JSON value into a well-formed trip
    ///
    /// Never fails: anything that is not an object becomes the default trip,
    /// and every field degrades to its default independently.
    pub fn normalize(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Parse and normalize a JSON document
    ///
    /// Only a syntax error is reported; the content itself is always coerced.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::Import(format!("invalid JSON: {}", e)))?;
        Ok(Self::normalize(value))
    }

    /// The bundled default document
    pub fn bundled() -> Self {
        Self::from_json_str(BUNDLED_TRIP).unwrap_or_default()
    }

    /// Find a day by id
    pub fn day(&self, id: &str) -> Option<&Day> {
        self.days.iter().find(|d| d.id == id)
    }

    /// Find a day by id, mutably
    pub fn day_mut(&mut self, id: &str) -> Option<&mut Day> {
        self.days.iter_mut().find(|d| d.id == id)
    }

    /// Position of a day in trip order
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.days.iter().position(|d| d.id == id)
    }

    /// Id of the day before `id`, if any
    pub fn previous_day_id(&self, id: &str) -> Option<&str> {
        let idx = self.index_of(id)?;
        idx.checked_sub(1)
            .and_then(|i| self.days.get(i))
            .map(|d| d.id.as_str())
    }

    /// Id of the day after `id`, if any
    pub fn next_day_id(&self, id: &str) -> Option<&str> {
        let idx = self.index_of(id)?;
        self.days.get(idx + 1).map(|d| d.id.as_str())
    }

    /// Hero image for the public view: explicit, else the first day's image
    pub fn effective_hero_image(&self) -> Option<&str> {
        if !self.hero_image.is_empty() {
            return Some(&self.hero_image);
        }
        self.days
            .first()
            .map(|d| d.image.as_str())
            .filter(|image| !image.is_empty())
    }
}
