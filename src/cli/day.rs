//! Day and highlight command handlers

use crate::cli::{open_planner, resolve_day};
use crate::error::{Error, Result};
use crate::planner::Planner;
use crate::store::{Axis, Command, DayField};
use clap::{Args, Subcommand};

/// Day command arguments
#[derive(Args)]
pub struct DayArgs {
    #[command(subcommand)]
    pub command: Option<DayCommand>,
}

/// Day subcommands
///
/// `<DAY>` is a 1-based position, a day id, or a unique id prefix.
#[derive(Subcommand)]
pub enum DayCommand {
    /// List days in trip order
    List,
    /// Append a new day and select it
    Add,
    /// Edit fields of a day
    Edit {
        day: String,
        #[command(flatten)]
        edit: DayEdit,
    },
    /// Move a day to a new 1-based position
    Move { day: String, position: usize },
    /// Delete a day
    Delete { day: String },
    /// Select a day (remembered for the next run)
    Select { day: String },
}

/// Field changes for `day edit`; omitted flags stay unchanged
#[derive(Args, Default)]
pub struct DayEdit {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub lng: Option<f64>,
}

impl DayEdit {
    /// Commands for the requested changes
    ///
    /// Coordinates are checked first so a bad value rejects the whole edit
    /// before anything is written.
    pub fn into_commands(self, id: &str) -> Result<Vec<Command>> {
        for value in [self.lat, self.lng].into_iter().flatten() {
            if !value.is_finite() {
                return Err(Error::InvalidCoordinates(format!(
                    "{} is not a finite number",
                    value
                )));
            }
        }

        let fields = [
            (DayField::Title, self.title),
            (DayField::Location, self.location),
            (DayField::Date, self.date),
            (DayField::Image, self.image),
            (DayField::Description, self.description),
        ];
        let mut commands: Vec<Command> = fields
            .into_iter()
            .filter_map(|(field, value)| {
                value.map(|value| Command::EditDay {
                    id: id.to_string(),
                    field,
                    value,
                })
            })
            .collect();
        for (axis, value) in [(Axis::Lat, self.lat), (Axis::Lng, self.lng)] {
            if let Some(value) = value {
                commands.push(Command::SetCoordinate {
                    id: id.to_string(),
                    axis,
                    value,
                });
            }
        }

        if commands.is_empty() {
            return Err(Error::Config("Nothing to edit (see --help)".to_string()));
        }
        Ok(commands)
    }
}

/// Highlight command arguments
#[derive(Args)]
pub struct HighlightArgs {
    #[command(subcommand)]
    pub command: HighlightCommand,
}

#[derive(Subcommand)]
pub enum HighlightCommand {
    /// Append a highlight to a day
    Add { day: String, text: String },
    /// Remove a highlight by its 1-based number
    Remove { day: String, number: usize },
}

/// Run the day command
pub async fn run(args: DayArgs) -> Result<()> {
    let mut planner = open_planner()?;
    let command = args.command.unwrap_or(DayCommand::List);

    match command {
        DayCommand::List => list(&planner),
        DayCommand::Add => {
            planner.dispatch(Command::AddDay)?;
            let position = planner.trip().days.len();
            println!(
                "Added day {} ({})",
                position,
                planner.store().selected_id().unwrap_or_default()
            );
        }
        DayCommand::Edit { day, edit } => {
            let id = resolve_day(planner.trip(), &day)?;
            for command in edit.into_commands(&id)? {
                planner.dispatch(command)?;
            }
            println!("Updated {}", id);
        }
        DayCommand::Move { day, position } => {
            let id = resolve_day(planner.trip(), &day)?;
            let from = planner
                .trip()
                .index_of(&id)
                .ok_or_else(|| Error::NotFound(format!("day {}", id)))?;
            let to = position.saturating_sub(1);
            if planner.dispatch(Command::MoveDay { from, to })? {
                println!("Moved {} to position {}", id, position);
            } else {
                println!("Nothing moved");
            }
        }
        DayCommand::Delete { day } => {
            let id = resolve_day(planner.trip(), &day)?;
            planner.dispatch(Command::DeleteDay { id: id.clone() })?;
            println!("Deleted {}", id);
        }
        DayCommand::Select { day } => {
            let id = resolve_day(planner.trip(), &day)?;
            planner.dispatch(Command::SelectDay { id: id.clone() })?;
            println!("Selected {}", id);
        }
    }

    planner.flush().await;
    Ok(())
}

/// Run the highlight command
pub async fn run_highlight(args: HighlightArgs) -> Result<()> {
    let mut planner = open_planner()?;

    match args.command {
        HighlightCommand::Add { day, text } => {
            let id = resolve_day(planner.trip(), &day)?;
            if planner.dispatch(Command::AddHighlight { id, text })? {
                println!("Highlight added");
            } else {
                println!("Empty highlight ignored");
            }
        }
        HighlightCommand::Remove { day, number } => {
            let id = resolve_day(planner.trip(), &day)?;
            let index = number.checked_sub(1).unwrap_or(usize::MAX);
            if planner.dispatch(Command::RemoveHighlight { id, index })? {
                println!("Highlight {} removed", number);
            } else {
                println!("No highlight {}", number);
            }
        }
    }

    planner.flush().await;
    Ok(())
}

fn list(planner: &Planner) {
    let trip = planner.trip();
    let selected = planner.store().selected_id();

    for (i, day) in trip.days.iter().enumerate() {
        let marker = if selected == Some(day.id.as_str()) { '*' } else { ' ' };
        println!(
            "{} {:>2}. {:<28} {:<16} {:<20} {}",
            marker,
            i + 1,
            day.title,
            day.location,
            day.id,
            day.coordinates.to_pair_string()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_commands_in_field_order() {
        let edit = DayEdit {
            title: Some("Lyon".to_string()),
            description: Some("Altstadt".to_string()),
            lat: Some(45.76),
            ..DayEdit::default()
        };
        let commands = edit.into_commands("day-1").unwrap();

        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0].name(), "edit_day");
        assert_eq!(
            commands[2],
            Command::SetCoordinate {
                id: "day-1".to_string(),
                axis: Axis::Lat,
                value: 45.76,
            }
        );
    }

    #[test]
    fn test_non_finite_coordinate_rejects_whole_edit() {
        let edit = DayEdit {
            title: Some("Lyon".to_string()),
            location: Some("Lyon".to_string()),
            lng: Some(f64::NAN),
            ..DayEdit::default()
        };
        assert!(matches!(
            edit.into_commands("day-1"),
            Err(Error::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_empty_edit_is_rejected() {
        assert!(matches!(
            DayEdit::default().into_commands("day-1"),
            Err(Error::Config(_))
        ));
    }
}
