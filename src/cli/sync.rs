//! Sync command handler
//!
//! Account, settings and manual push/pull against the remote store.

use crate::cli::open_planner;
use crate::error::{Error, Result};
use crate::sync::SyncStatus;
use clap::{Args, Subcommand, ValueEnum};
use std::io::BufRead;

/// Sync command arguments
#[derive(Args)]
pub struct SyncArgs {
    #[command(subcommand)]
    pub command: Option<SyncCommand>,
}

#[derive(Subcommand)]
pub enum SyncCommand {
    /// Show endpoint, session and auto-sync state
    Status,
    /// Create an account
    Signup(Credentials),
    /// Sign in with email and password
    Login(Credentials),
    /// Sign out
    Logout,
    /// Upload the trip now
    Push,
    /// Replace the local trip with the remote copy
    Pull {
        /// Load the newest public row for the slug (no login required)
        #[arg(long)]
        public: bool,
    },
    /// Turn auto-sync on or off
    Auto { state: Toggle },
    /// Change sync settings (omitted flags stay unchanged)
    Settings {
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        anon_key: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Args)]
pub struct Credentials {
    /// Account email (defaults to the stored one)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Password (read from stdin when omitted)
    #[arg(long, short = 'p')]
    pub password: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

/// Run the sync command
pub async fn run(args: SyncArgs) -> Result<()> {
    let mut planner = open_planner()?;

    let status = match args.command.unwrap_or(SyncCommand::Status) {
        SyncCommand::Status => {
            let settings = planner.settings();
            println!("Endpoint:  {}", or_unset(&settings.url));
            println!("Trip-ID:   {}", or_unset(&settings.slug));
            println!("Auto-Sync: {}", if settings.auto { "an" } else { "aus" });
            planner.refresh_session_status()
        }
        SyncCommand::Signup(credentials) => {
            let (email, password) = credentials.resolve(&planner.settings().email)?;
            planner.sign_up(&email, &password).await?
        }
        SyncCommand::Login(credentials) => {
            let (email, password) = credentials.resolve(&planner.settings().email)?;
            planner.sign_in(&email, &password).await?
        }
        SyncCommand::Logout => planner.sign_out().await?,
        SyncCommand::Push => planner.push_now().await,
        SyncCommand::Pull { public: true } => {
            if planner.autoload_public().await? {
                SyncStatus::ok(format!("Geladen ({} Tage)", planner.trip().days.len()))
            } else {
                SyncStatus::warn("Kein Trip gefunden (Trip-ID korrekt?)")
            }
        }
        SyncCommand::Pull { public: false } => planner.pull_now().await?,
        SyncCommand::Auto { state } => planner.set_auto_sync(matches!(state, Toggle::On))?,
        SyncCommand::Settings {
            url,
            anon_key,
            slug,
            email,
        } => {
            planner.update_settings(|s| {
                if let Some(url) = url {
                    s.url = url;
                }
                if let Some(key) = anon_key {
                    s.anon_key = key;
                }
                if let Some(slug) = slug {
                    s.slug = slug;
                }
                if let Some(email) = email {
                    s.email = email;
                }
            })?;
            SyncStatus::ok("Einstellungen gespeichert")
        }
    };

    planner.flush().await;
    println!("{}", status);
    Ok(())
}

impl Credentials {
    fn resolve(self, stored_email: &str) -> Result<(String, String)> {
        let email = self
            .email
            .unwrap_or_else(|| stored_email.to_string());

        let password = match self.password {
            Some(password) => password,
            None => {
                eprint!("Passwort: ");
                let mut line = String::new();
                std::io::stdin().lock().read_line(&mut line)?;
                line.trim_end_matches(['\r', '\n']).to_string()
            }
        };

        if email.trim().is_empty() {
            return Err(Error::Config("E-Mail fehlt (--email)".to_string()));
        }
        Ok((email, password))
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(nicht gesetzt)"
    } else {
        value
    }
}
