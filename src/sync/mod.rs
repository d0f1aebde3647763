//! Remote sync
//!
//! Optional mirroring of the whole trip document to a remote row store,
//! keyed by `(owner, slug)`. Sync is strictly best-effort: every failure is
//! turned into a [`SyncStatus`] and the local document stays authoritative.
//!
//! ## Flex Point
//! The core only talks to [`SyncGateway`]. Adding a backend means
//! implementing the trait; [`supabase::SupabaseGateway`] is the shipped one.

pub mod scheduler;
pub mod session;
pub mod settings;
pub mod supabase;

use crate::error::Result;
use crate::trip::Trip;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub use scheduler::AutoSync;
pub use session::Session;
pub use settings::SyncSettings;
pub use supabase::SupabaseGateway;

/// A trip row as read back from the remote store
///
/// `data` is handed over raw; the store normalizes it before swapping in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTrip {
    pub data: Value,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Who the gateway is acting as
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Boundary to the remote row store
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// Newest row for `slug` across all owners, no authentication required
    async fn pull_public(&self, slug: &str) -> Result<Option<RemoteTrip>>;

    /// Row for `(owner, slug)`, requires a signed-in session
    async fn pull_authenticated(&self, owner: Uuid, slug: &str) -> Result<Option<RemoteTrip>>;

    /// Upsert the whole document on `(owner, slug)`; returns the write time
    async fn push(&self, owner: Uuid, slug: &str, trip: &Trip) -> Result<DateTime<Utc>>;

    /// Register a new account
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp>;

    /// Start a session with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionState>;

    /// End the current session
    async fn sign_out(&self) -> Result<()>;

    /// Current session as far as the gateway knows
    fn session_state(&self) -> SessionState;
}

/// Outcome of a sign-up request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignUp {
    /// Account created and signed in
    SignedIn,
    /// Account created, email confirmation pending
    ConfirmationPending,
}

/// Outcome severity of the last sync action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Ok,
    Warn,
}

/// User-facing status line of the last sync action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub kind: StatusKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl SyncStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Ok,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Warn,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.kind == StatusKind::Ok
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = match self.kind {
            StatusKind::Ok => "ok",
            StatusKind::Warn => "warn",
        };
        write!(f, "[{}] {}", marker, self.message)
    }
}

/// Shared slot holding the most recent sync status
///
/// Written by explicit actions and by the auto-sync task.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<Mutex<Option<SyncStatus>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, status: SyncStatus) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = Some(status);
        }
    }

    pub fn latest(&self) -> Option<SyncStatus> {
        self.inner.lock().ok().and_then(|slot| slot.clone())
    }
}

/// Push the trip for the current session, reporting instead of failing
pub async fn push_trip(gateway: &dyn SyncGateway, slug: &str, trip: &Trip) -> SyncStatus {
    if slug.trim().is_empty() {
        return SyncStatus::warn("Trip-ID fehlt");
    }
    let Some(owner) = gateway.session_state().owner_id else {
        return SyncStatus::warn("Bitte erst einloggen");
    };

    match gateway.push(owner, slug.trim(), trip).await {
        Ok(at) => {
            tracing::info!(slug, days = trip.days.len(), "pushed trip");
            SyncStatus::ok(format!(
                "Gespeichert ({})",
                at.with_timezone(&chrono::Local).format("%H:%M:%S")
            ))
        }
        Err(e) => {
            tracing::warn!(slug, "push failed: {}", e);
            SyncStatus::warn(format!("Speichern fehlgeschlagen: {}", e))
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory gateway for tests

    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct FakeGateway {
        pub rows: Mutex<HashMap<(Uuid, String), RemoteTrip>>,
        pub owner: Mutex<Option<Uuid>>,
        pub pushes: Mutex<Vec<Trip>>,
        pub fail: Mutex<bool>,
        /// Artificial latency for push and pull
        pub delay: Mutex<std::time::Duration>,
    }

    impl FakeGateway {
        pub fn signed_in() -> Self {
            let gateway = Self::default();
            *gateway.owner.lock().unwrap() = Some(Uuid::new_v4());
            gateway
        }

        pub fn owner(&self) -> Option<Uuid> {
            *self.owner.lock().unwrap()
        }

        pub fn push_count(&self) -> usize {
            self.pushes.lock().unwrap().len()
        }

        pub fn with_delay(self, delay: std::time::Duration) -> Self {
            *self.delay.lock().unwrap() = delay;
            self
        }

        async fn lag(&self) {
            let delay = *self.delay.lock().unwrap();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        pub fn insert(&self, owner: Uuid, slug: &str, data: Value) {
            self.rows.lock().unwrap().insert(
                (owner, slug.to_string()),
                RemoteTrip {
                    data,
                    updated_at: Some(Utc::now()),
                },
            );
        }
    }

    #[async_trait]
    impl SyncGateway for FakeGateway {
        async fn pull_public(&self, slug: &str) -> Result<Option<RemoteTrip>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|((_, s), _)| s == slug)
                .max_by_key(|(_, row)| row.updated_at)
                .map(|(_, row)| row.clone()))
        }

        async fn pull_authenticated(&self, owner: Uuid, slug: &str) -> Result<Option<RemoteTrip>> {
            self.lag().await;
            Ok(self
                .rows
                .lock()
                .unwrap()
                .get(&(owner, slug.to_string()))
                .cloned())
        }

        async fn push(&self, owner: Uuid, slug: &str, trip: &Trip) -> Result<DateTime<Utc>> {
            self.lag().await;
            if *self.fail.lock().unwrap() {
                return Err(Error::Sync("remote unavailable".to_string()));
            }
            self.pushes.lock().unwrap().push(trip.clone());
            self.insert(owner, slug, serde_json::to_value(trip)?);
            Ok(Utc::now())
        }

        async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp> {
            self.sign_in(email, password).await?;
            Ok(SignUp::SignedIn)
        }

        async fn sign_in(&self, email: &str, password: &str) -> Result<SessionState> {
            if email.is_empty() || password != "geheim" {
                return Err(Error::Sync("Invalid login credentials".to_string()));
            }
            *self.owner.lock().unwrap() = Some(Uuid::new_v4());
            Ok(self.session_state())
        }

        async fn sign_out(&self) -> Result<()> {
            *self.owner.lock().unwrap() = None;
            Ok(())
        }

        fn session_state(&self) -> SessionState {
            let owner = self.owner();
            SessionState {
                signed_in: owner.is_some(),
                owner_id: owner,
                email: None,
            }
        }
    }
}
