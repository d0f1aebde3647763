//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default remote trip slug (empty: user must choose one)
pub const DEFAULT_SLUG: &str = "";

/// Load the newest public row for the slug on startup
pub const DEFAULT_AUTOLOAD_PUBLIC: bool = true;

/// Quiet period before an auto-sync push, in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = crate::constants::remote::AUTO_SYNC_DEBOUNCE_MS;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7879;

/// Map center used when no day is focused
pub const DEFAULT_MAP_LAT: f64 = crate::constants::geo::FALLBACK_LAT;
pub const DEFAULT_MAP_LNG: f64 = crate::constants::geo::FALLBACK_LNG;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "roadtrip-planner";
