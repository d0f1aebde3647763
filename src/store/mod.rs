//! Trip state store
//!
//! Owns the in-memory trip and the selected day. Every mutation is written
//! to the local key-value store before `apply` returns, so local state is
//! always consistent with the latest edit regardless of pending sync.

pub mod command;

use crate::constants::storage::{SELECTION_KEY, TRIP_KEY};
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::route::RouteSummary;
use crate::station::{derive_stations, Station, StationSnapshot};
use crate::storage::{load_json, save_json, KeyValueStore};
use crate::trip::{Day, Trip, NEW_DAY_TITLE};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use command::{Axis, Command, DayField};

/// Title of the day seeded into an otherwise empty trip
const FIRST_DAY_TITLE: &str = "Tag 1";

/// Export document: the trip plus a derived station snapshot
#[derive(Debug, Serialize)]
pub struct TripExport<'a> {
    #[serde(flatten)]
    pub trip: &'a Trip,
    pub stations: Vec<StationSnapshot>,
}

/// The single owner of the trip document
pub struct TripStore {
    trip: Trip,
    selected: Option<String>,
    kv: Arc<dyn KeyValueStore>,
    /// Where new days are placed
    fallback: Coordinates,
}

impl TripStore {
    /// Boot: prefer the locally persisted trip over the bundled default
    ///
    /// An empty trip gets one seeded day at `fallback`. The previously
    /// selected day is restored if it still exists, else the first day is
    /// selected. The result is persisted.
    pub fn load(kv: Arc<dyn KeyValueStore>, fallback: Coordinates) -> Result<Self> {
        let mut trip = Self::load_local(kv.as_ref())?.unwrap_or_else(Trip::bundled);

        if trip.days.is_empty() {
            trip.days.push(Day::new(FIRST_DAY_TITLE, fallback));
        }

        let mut store = Self {
            trip,
            selected: None,
            kv,
            fallback,
        };
        store.select_first();
        store.restore_selection();
        store.persist()?;
        Ok(store)
    }

    /// Create a store around an existing trip without touching persistence
    pub fn with_trip(kv: Arc<dyn KeyValueStore>, trip: Trip) -> Self {
        let mut store = Self {
            trip,
            selected: None,
            kv,
            fallback: Coordinates::fallback(),
        };
        store.select_first();
        store
    }

    /// Place new days at `fallback` instead of the built-in center
    pub fn with_fallback(mut self, fallback: Coordinates) -> Self {
        self.fallback = fallback;
        self
    }

    /// Re-select the day stored by a previous session, if it still exists
    fn restore_selection(&mut self) {
        match load_json::<String>(self.kv.as_ref(), SELECTION_KEY) {
            Ok(Some(id)) if self.trip.day(&id).is_some() => self.selected = Some(id),
            Ok(_) => {}
            Err(e) => warn!("ignoring stored selection: {}", e),
        }
    }

    /// Locally persisted trip, if there is a usable one
    ///
    /// Usable means valid JSON with a `days` array; anything else is treated
    /// like a first run.
    fn load_local(kv: &dyn KeyValueStore) -> Result<Option<Trip>> {
        let Some(raw) = kv.get(TRIP_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) if value.get("days").is_some_and(Value::is_array) => {
                Ok(Some(Trip::normalize(value)))
            }
            Ok(_) => {
                warn!("stored trip has no days array, using bundled trip");
                Ok(None)
            }
            Err(e) => {
                warn!("stored trip is not valid JSON ({}), using bundled trip", e);
                Ok(None)
            }
        }
    }

    /// The current trip
    pub fn trip(&self) -> &Trip {
        &self.trip
    }

    /// Id of the selected day
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Selected day, falling back to the first day
    pub fn focused_day(&self) -> Option<&Day> {
        self.selected
            .as_deref()
            .and_then(|id| self.trip.day(id))
            .or_else(|| self.trip.days.first())
    }

    /// Stations derived from the current day order
    pub fn stations(&self) -> Vec<Station> {
        derive_stations(&self.trip.days)
    }

    /// Route derived from the current day order
    pub fn route(&self) -> RouteSummary {
        RouteSummary::from_days(&self.trip.days)
    }

    /// Apply a command
    ///
    /// Returns `true` when the document changed (and was persisted),
    /// `false` for no-ops and selection changes.
    pub fn apply(&mut self, command: Command) -> Result<bool> {
        let name = command.name();
        let changed = match command {
            Command::SetTitle { title } => {
                self.trip.trip_title = title;
                true
            }
            Command::AddDay => {
                let day = Day::new(NEW_DAY_TITLE, self.fallback);
                self.selected = Some(day.id.clone());
                self.trip.days.push(day);
                true
            }
            Command::SelectDay { id } => {
                self.require_day(&id)?;
                self.selected = Some(id);
                self.persist_selection()?;
                false
            }
            Command::EditDay { id, field, value } => {
                let day = self.require_day_mut(&id)?;
                let slot = match field {
                    DayField::Title => &mut day.title,
                    DayField::Location => &mut day.location,
                    DayField::Date => &mut day.date,
                    DayField::Image => &mut day.image,
                    DayField::Description => &mut day.description,
                };
                *slot = value;
                true
            }
            Command::SetCoordinate { id, axis, value } => {
                if !value.is_finite() {
                    return Err(Error::InvalidCoordinates(format!(
                        "{} is not a finite number",
                        value
                    )));
                }
                let day = self.require_day_mut(&id)?;
                match axis {
                    Axis::Lat => day.coordinates.lat = value,
                    Axis::Lng => day.coordinates.lng = value,
                }
                true
            }
            Command::AddHighlight { id, text } => {
                let text = text.trim();
                if text.is_empty() {
                    false
                } else {
                    let text = text.to_string();
                    self.require_day_mut(&id)?.highlights.push(text);
                    true
                }
            }
            Command::RemoveHighlight { id, index } => {
                let day = self.require_day_mut(&id)?;
                if index < day.highlights.len() {
                    day.highlights.remove(index);
                    true
                } else {
                    false
                }
            }
            Command::MoveDay { from, to } => self.move_day(from, to),
            Command::DeleteDay { id } => self.delete_day(&id)?,
            Command::Import { json } => {
                self.import_json(&json)?;
                return Ok(true);
            }
            Command::Reset => {
                self.reset()?;
                return Ok(true);
            }
        };

        if changed {
            self.persist()?;
        }
        debug!(command = name, changed, "applied");
        Ok(changed)
    }

    /// Reorder: remove at `from`, insert at `to`
    ///
    /// No-op when the indices are equal or either is out of range.
    fn move_day(&mut self, from: usize, to: usize) -> bool {
        let len = self.trip.days.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let day = self.trip.days.remove(from);
        self.trip.days.insert(to, day);
        true
    }

    /// Delete a day
    ///
    /// If it was selected, the day now at the same index is selected, else
    /// the previous one, else nothing.
    fn delete_day(&mut self, id: &str) -> Result<bool> {
        let idx = self
            .trip
            .index_of(id)
            .ok_or_else(|| Error::NotFound(format!("day {}", id)))?;
        self.trip.days.remove(idx);

        let was_selected = self.selected.as_deref().map_or(true, |s| s == id);
        if was_selected {
            self.selected = self
                .trip
                .days
                .get(idx)
                .or_else(|| idx.checked_sub(1).and_then(|i| self.trip.days.get(i)))
                .map(|d| d.id.clone());
        }
        Ok(true)
    }

    /// Replace the document from external JSON
    ///
    /// Invalid JSON is reported and leaves the current state untouched.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let trip = Trip::from_json_str(text)?;
        info!(days = trip.days.len(), "imported trip");
        self.replace(trip)
    }

    /// Swap in a whole replacement document (import, remote pull)
    pub fn replace(&mut self, trip: Trip) -> Result<()> {
        self.trip = trip;
        self.select_first();
        self.persist()
    }

    /// Export view of the current state with freshly derived stations
    pub fn export(&self) -> TripExport<'_> {
        TripExport {
            trip: &self.trip,
            stations: self.stations().iter().map(Station::snapshot).collect(),
        }
    }

    /// Pretty-printed export document
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }

    /// Clear local persistence and reload the bundled document
    pub fn reset(&mut self) -> Result<()> {
        self.kv.remove(TRIP_KEY)?;
        info!("reset to bundled trip");
        self.replace(Trip::bundled())
    }

    fn select_first(&mut self) {
        self.selected = self.trip.days.first().map(|d| d.id.clone());
    }

    fn require_day(&self, id: &str) -> Result<&Day> {
        self.trip
            .day(id)
            .ok_or_else(|| Error::NotFound(format!("day {}", id)))
    }

    fn require_day_mut(&mut self, id: &str) -> Result<&mut Day> {
        self.trip
            .day_mut(id)
            .ok_or_else(|| Error::NotFound(format!("day {}", id)))
    }

    fn persist(&self) -> Result<()> {
        save_json(self.kv.as_ref(), TRIP_KEY, &self.trip)?;
        self.persist_selection()
    }

    fn persist_selection(&self) -> Result<()> {
        match &self.selected {
            Some(id) => save_json(self.kv.as_ref(), SELECTION_KEY, id),
            None => self.kv.remove(SELECTION_KEY),
        }
    }
}
