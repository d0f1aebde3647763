//! Server shared state
//!
//! Holds configuration and the planner shared by all handlers.

use crate::config::Config;
use crate::error::Result;
use crate::planner::Planner;
use tokio::sync::RwLock;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// The one planner; handlers serialize mutations through the lock
    pub planner: RwLock<Planner>,
}

impl AppState {
    /// Open the planner from the configured storage
    pub fn open(config: Config) -> Result<Self> {
        let planner = Planner::open(&config)?;
        Ok(Self::new(config, planner))
    }

    /// Wrap an existing planner
    pub fn new(config: Config, planner: Planner) -> Self {
        Self {
            config,
            planner: RwLock::new(planner),
        }
    }
}
