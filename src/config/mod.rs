//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/roadtrip-planner/config.toml

pub mod defaults;

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Local persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Deployment defaults for remote sync
    #[serde(default)]
    pub sync: SyncConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Map view settings
    #[serde(default)]
    pub map: MapConfig,
}

/// Local persistence settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the key-value directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Remote sync defaults
///
/// Per-user settings stored next to the trip take precedence over these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Supabase project URL
    #[serde(default)]
    pub url: String,

    /// Publishable (anon) key
    #[serde(default)]
    pub anon_key: String,

    /// Trip slug shared between devices
    #[serde(default = "default_slug")]
    pub slug: String,

    /// Load the newest public row for the slug on startup
    #[serde(default = "default_autoload_public")]
    pub autoload_public: bool,

    /// Quiet period before an auto-sync push
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory with the static front end, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

/// Map view settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_map_lat")]
    pub fallback_lat: f64,

    #[serde(default = "default_map_lng")]
    pub fallback_lng: f64,
}

// Default value functions for serde
fn default_slug() -> String {
    DEFAULT_SLUG.to_string()
}
fn default_autoload_public() -> bool {
    DEFAULT_AUTOLOAD_PUBLIC
}
fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_map_lat() -> f64 {
    DEFAULT_MAP_LAT
}
fn default_map_lng() -> f64 {
    DEFAULT_MAP_LNG
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            slug: default_slug(),
            autoload_public: default_autoload_public(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            fallback_lat: default_map_lat(),
            fallback_lng: default_map_lng(),
        }
    }
}

impl MapConfig {
    /// Map center when nothing is focused
    pub fn fallback_center(&self) -> Coordinates {
        Coordinates::new(self.fallback_lat, self.fallback_lng)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key". Unset optional paths read as "".
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["storage", "data_dir"] => Some(
                self.storage
                    .data_dir
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),

            ["sync", "url"] => Some(self.sync.url.clone()),
            ["sync", "anon_key"] => Some(self.sync.anon_key.clone()),
            ["sync", "slug"] => Some(self.sync.slug.clone()),
            ["sync", "autoload_public"] => Some(self.sync.autoload_public.to_string()),
            ["sync", "debounce_ms"] => Some(self.sync.debounce_ms.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "static_dir"] => Some(
                self.server
                    .static_dir
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),

            ["map", "fallback_lat"] => Some(self.map.fallback_lat.to_string()),
            ["map", "fallback_lng"] => Some(self.map.fallback_lng.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key". An empty value clears optional paths.
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["storage", "data_dir"] => {
                self.storage.data_dir = optional_path(value);
            }

            ["sync", "url"] => {
                self.sync.url = value.trim().to_string();
            }
            ["sync", "anon_key"] => {
                self.sync.anon_key = value.trim().to_string();
            }
            ["sync", "slug"] => {
                self.sync.slug = value.trim().to_string();
            }
            ["sync", "autoload_public"] => {
                self.sync.autoload_public = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid boolean value: {}", value))
                })?;
            }
            ["sync", "debounce_ms"] => {
                self.sync.debounce_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid debounce value: {}", value))
                })?;
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }
            ["server", "static_dir"] => {
                self.server.static_dir = optional_path(value);
            }

            ["map", "fallback_lat"] => {
                let lat = parse_degrees(value)?;
                Coordinates::new(lat, self.map.fallback_lng).validate()?;
                self.map.fallback_lat = lat;
            }
            ["map", "fallback_lng"] => {
                let lng = parse_degrees(value)?;
                Coordinates::new(self.map.fallback_lat, lng).validate()?;
                self.map.fallback_lng = lng;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "storage.data_dir",
            "sync.url",
            "sync.anon_key",
            "sync.slug",
            "sync.autoload_public",
            "sync.debounce_ms",
            "server.host",
            "server.port",
            "server.static_dir",
            "map.fallback_lat",
            "map.fallback_lng",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn parse_degrees(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("Invalid coordinate value: {}", value)))
}
