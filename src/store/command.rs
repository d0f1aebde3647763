//! Editing commands
//!
//! Every user action on the trip is one of these, applied through
//! [`TripStore::apply`](crate::store::TripStore::apply).

use serde::{Deserialize, Serialize};

/// Editable free-text field of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayField {
    Title,
    Location,
    Date,
    Image,
    Description,
}

impl std::fmt::Display for DayField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Location => write!(f, "location"),
            Self::Date => write!(f, "date"),
            Self::Image => write!(f, "image"),
            Self::Description => write!(f, "description"),
        }
    }
}

impl std::str::FromStr for DayField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "location" | "ort" => Ok(Self::Location),
            "date" | "datum" => Ok(Self::Date),
            "image" | "img" => Ok(Self::Image),
            "description" | "desc" => Ok(Self::Description),
            _ => Err(format!("Unknown day field: {}", s)),
        }
    }
}

/// Which half of a coordinate pair to edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Lat,
    Lng,
}

/// A named user action on the trip document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Rename the whole trip
    SetTitle { title: String },

    /// Append a new day at the fallback coordinates and select it
    AddDay,

    /// Change the selected day (stored apart from the document)
    SelectDay { id: String },

    /// Replace one text field of a day
    EditDay { id: String, field: DayField, value: String },

    /// Replace latitude or longitude; non-finite values are rejected
    SetCoordinate { id: String, axis: Axis, value: f64 },

    /// Append a highlight (trimmed; empty input is ignored)
    AddHighlight { id: String, text: String },

    /// Remove the highlight at `index`
    RemoveHighlight { id: String, index: usize },

    /// Move the day at `from` to position `to`
    MoveDay { from: usize, to: usize },

    /// Remove a day and select a neighbour
    DeleteDay { id: String },

    /// Replace the whole document from external JSON
    Import { json: String },

    /// Drop local data and reload the bundled document
    Reset,
}

impl Command {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetTitle { .. } => "set_title",
            Self::AddDay => "add_day",
            Self::SelectDay { .. } => "select_day",
            Self::EditDay { .. } => "edit_day",
            Self::SetCoordinate { .. } => "set_coordinate",
            Self::AddHighlight { .. } => "add_highlight",
            Self::RemoveHighlight { .. } => "remove_highlight",
            Self::MoveDay { .. } => "move_day",
            Self::DeleteDay { .. } => "delete_day",
            Self::Import { .. } => "import",
            Self::Reset => "reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_day_field_from_str() {
        assert_eq!(DayField::from_str("Title").unwrap(), DayField::Title);
        assert_eq!(DayField::from_str("ort").unwrap(), DayField::Location);
        assert!(DayField::from_str("coordinates").is_err());
    }

    #[test]
    fn test_command_json_shape() {
        let cmd: Command = serde_json::from_value(serde_json::json!({
            "command": "move_day",
            "from": 0,
            "to": 2
        }))
        .unwrap();
        assert_eq!(cmd, Command::MoveDay { from: 0, to: 2 });

        let cmd: Command = serde_json::from_value(serde_json::json!({
            "command": "edit_day",
            "id": "day-1",
            "field": "location",
            "value": "Paris"
        }))
        .unwrap();
        assert_eq!(cmd.name(), "edit_day");
    }
}
