//! Station derivation
//!
//! Groups contiguous days sharing an effective name into stations. A repeat
//! of the same place after a different day opens a new station.

use crate::coord::Coordinates;
use crate::trip::Day;
use serde::{Deserialize, Serialize};

/// A run of consecutive days at the same place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub name: String,
    /// One day counts as one night
    pub nights: usize,
    /// First non-empty image among the member days
    pub image: String,
    /// Coordinates of the first member day
    pub coordinates: Coordinates,
    pub day_ids: Vec<String>,
}

impl Station {
    fn open(day: &Day) -> Self {
        Self {
            name: day.effective_name().to_string(),
            nights: 1,
            image: day.image.clone(),
            coordinates: day.coordinates,
            day_ids: vec![day.id.clone()],
        }
    }

    fn absorb(&mut self, day: &Day) {
        self.day_ids.push(day.id.clone());
        self.nights += 1;
        if self.image.is_empty() && !day.image.is_empty() {
            self.image = day.image.clone();
        }
    }

    /// `"1 Nacht"` or `"{n} Nächte"`
    pub fn nights_label(&self) -> String {
        nights_label(self.nights)
    }

    /// Day to jump to when the station is picked
    pub fn first_day_id(&self) -> Option<&str> {
        self.day_ids.first().map(String::as_str)
    }

    /// Read-only export form
    pub fn snapshot(&self) -> StationSnapshot {
        StationSnapshot {
            name: self.name.clone(),
            nights: self.nights_label(),
            coordinates: self.coordinates,
            image: self.image.clone(),
        }
    }
}

/// Station as written into an export file
///
/// Purely informational; imports ignore it and regenerate stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSnapshot {
    pub name: String,
    pub nights: String,
    pub coordinates: Coordinates,
    pub image: String,
}

/// Night-count label with a singular/plural branch
pub fn nights_label(nights: usize) -> String {
    if nights == 1 {
        "1 Nacht".to_string()
    } else {
        format!("{} Nächte", nights)
    }
}

/// Single left-to-right scan over the days
pub fn derive_stations(days: &[Day]) -> Vec<Station> {
    let mut stations: Vec<Station> = Vec::new();

    for day in days {
        match stations.last_mut() {
            Some(current) if current.name == day.effective_name() => current.absorb(day),
            _ => stations.push(Station::open(day)),
        }
    }

    stations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(title: &str, location: &str) -> Day {
        Day::new(title, Coordinates::new(1.0, 2.0)).with_location(location)
    }

    #[test]
    fn test_empty() {
        assert!(derive_stations(&[]).is_empty());
    }

    #[test]
    fn test_all_distinct() {
        let days = vec![day("a", "Paris"), day("b", "Lyon"), day("c", "Nizza")];
        let stations = derive_stations(&days);

        assert_eq!(stations.len(), 3);
        for (station, day) in stations.iter().zip(&days) {
            assert_eq!(station.nights, 1);
            assert_eq!(station.day_ids, vec![day.id.clone()]);
        }
    }

    #[test]
    fn test_all_same() {
        let days: Vec<Day> = (0..5).map(|i| day(&format!("Tag {}", i), "Paris")).collect();
        let stations = derive_stations(&days);

        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].nights, 5);
        assert_eq!(stations[0].nights_label(), "5 Nächte");
        assert_eq!(stations[0].first_day_id(), Some(days[0].id.as_str()));
    }

    #[test]
    fn test_paris_paris_nice() {
        let stations = derive_stations(&[day("1", "Paris"), day("2", "Paris"), day("3", "Nice")]);
        let summary: Vec<(&str, usize)> =
            stations.iter().map(|s| (s.name.as_str(), s.nights)).collect();
        assert_eq!(summary, vec![("Paris", 2), ("Nice", 1)]);
    }

    #[test]
    fn test_non_contiguous_repeat_splits() {
        let stations = derive_stations(&[day("1", "Paris"), day("2", "Lyon"), day("3", "Paris")]);
        assert_eq!(stations.len(), 3);
        assert_eq!(stations[0].name, "Paris");
        assert_eq!(stations[2].name, "Paris");
    }

    #[test]
    fn test_name_fallbacks() {
        let stations = derive_stations(&[
            day("Anreise", ""),
            day("Anreise", "  "),
            day("", ""),
            day("x", " Paris "),
            day("y", "Paris"),
        ]);
        let names: Vec<&str> = stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Anreise", "Station", "Paris"]);
        assert_eq!(stations[0].nights, 2);
        assert_eq!(stations[2].nights, 2);
    }

    #[test]
    fn test_image_backfill() {
        let days = vec![
            day("1", "Paris"),
            day("2", "Paris").with_image("https://img/2.jpg"),
            day("3", "Paris").with_image("https://img/3.jpg"),
        ];
        let stations = derive_stations(&days);
        assert_eq!(stations[0].image, "https://img/2.jpg");
    }

    #[test]
    fn test_station_keeps_first_coordinates() {
        let mut second = day("2", "Paris");
        second.coordinates = Coordinates::new(9.0, 9.0);
        let stations = derive_stations(&[day("1", "Paris"), second]);
        assert_eq!(stations[0].coordinates, Coordinates::new(1.0, 2.0));
    }

    #[test]
    fn test_nights_label() {
        assert_eq!(nights_label(1), "1 Nacht");
        assert_eq!(nights_label(2), "2 Nächte");
        assert_eq!(nights_label(0), "0 Nächte");
    }

    #[test]
    fn test_snapshot() {
        let stations = derive_stations(&[day("1", "Paris"), day("2", "Paris")]);
        let snapshot = stations[0].snapshot();
        assert_eq!(snapshot.name, "Paris");
        assert_eq!(snapshot.nights, "2 Nächte");
    }
}
