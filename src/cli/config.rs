//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "sync.slug")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Config::config_path()?.display());
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (args.key.as_deref(), args.value.as_deref()) {
        (None, None) => show_all_config(&config),

        (Some(key), None) => match config.get(key) {
            Some(value) => println!("{}", value),
            None => {
                return Err(Error::Config(format!(
                    "Unknown config key: {} (available: {})",
                    key,
                    Config::available_keys().join(", ")
                )));
            }
        },

        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        (None, Some(_)) => {
            return Err(Error::Config("Must specify a key to set a value".to_string()));
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[storage]");
    match &config.storage.data_dir {
        Some(dir) => println!("data_dir = \"{}\"", dir.display()),
        None => println!("data_dir = \"\" # default data directory"),
    }
    println!();

    println!("[sync]");
    println!("url = \"{}\"", config.sync.url);
    if config.sync.anon_key.is_empty() {
        println!("anon_key = \"\" # not configured");
    } else {
        println!("anon_key = \"***\" # configured");
    }
    println!("slug = \"{}\"", config.sync.slug);
    println!("autoload_public = {}", config.sync.autoload_public);
    println!("debounce_ms = {}", config.sync.debounce_ms);
    println!();

    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    if let Some(dir) = &config.server.static_dir {
        println!("static_dir = \"{}\"", dir.display());
    }
    println!();

    println!("[map]");
    println!("fallback_lat = {}", config.map.fallback_lat);
    println!("fallback_lng = {}", config.map.fallback_lng);
}
