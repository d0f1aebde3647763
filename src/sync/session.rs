//! Authenticated remote session
//!
//! Tokens returned by the auth service, persisted in their own key so the
//! credential-free settings blob never holds secrets.

use crate::constants::storage::SESSION_KEY;
use crate::error::Result;
use crate::storage::{load_json, save_json, KeyValueStore};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Refresh this long before the token actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Access and refresh tokens plus their owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: SessionUser,
}

impl Session {
    /// Build from a token response (`expires_in` seconds from now)
    pub fn issued(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        user: SessionUser,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
            user,
        }
    }

    /// Token is expired or about to expire
    pub fn needs_refresh(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }

    /// Load the persisted session, if any
    ///
    /// An unreadable or corrupt session is treated as signed out.
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        load_json(store, SESSION_KEY).ok().flatten()
    }

    /// Persist (or clear, with `None`) the session
    pub fn store(store: &dyn KeyValueStore, session: Option<&Self>) -> Result<()> {
        match session {
            Some(session) => save_json(store, SESSION_KEY, session),
            None => store.remove(SESSION_KEY),
        }
    }
}
