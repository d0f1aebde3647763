//! roadtrip-planner: road trip itinerary planner
//!
//! A library and CLI tool for planning a multi-day road trip as an ordered
//! list of days, with derived route legs and overnight stations.
//!
//! ## Features
//!
//! - Lenient import of hand-edited or outdated trip documents
//! - Straight-line route legs (haversine) and map deep links
//! - Contiguous same-place days grouped into stations
//! - Local persistence plus optional debounced sync to a Supabase table
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use roadtrip_planner::route::RouteSummary;
//! use roadtrip_planner::station::derive_stations;
//! use roadtrip_planner::trip::Trip;
//!
//! let trip = Trip::bundled();
//! let route = RouteSummary::from_days(&trip.days);
//! println!("{}, {}", route.legs_label(), route.total_label());
//!
//! for station in derive_stations(&trip.days) {
//!     println!("{} ({})", station.name, station.nights_label());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod planner;
pub mod route;
pub mod server;
pub mod station;
pub mod storage;
pub mod store;
pub mod sync;
pub mod trip;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, Result};
pub use planner::Planner;
pub use store::{Command, TripStore};
pub use trip::{Day, Trip};
