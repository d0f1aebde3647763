//! Supabase gateway
//!
//! Talks to a Supabase project over its REST (PostgREST) and auth (GoTrue)
//! endpoints. Expected schema:
//!
//! ```sql
//! create table trips (
//!   id uuid primary key default gen_random_uuid(),
//!   owner uuid not null,
//!   slug text not null,
//!   data jsonb not null,
//!   updated_at timestamptz not null default now(),
//!   unique (owner, slug)
//! );
//! ```
//!
//! Row-level security restricts writes (and authenticated reads) to
//! `owner = auth.uid()`. Public auto-load needs an additional read policy.

use crate::constants::remote::{REQUEST_TIMEOUT_SECS, TRIPS_TABLE};
use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use crate::sync::session::{Session, SessionUser};
use crate::sync::{RemoteTrip, SessionState, SignUp, SyncGateway};
use crate::trip::Trip;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Gateway to a Supabase project
pub struct SupabaseGateway {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    session_store: Option<Arc<dyn KeyValueStore>>,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: SessionUser,
}

/// Auth error body (`msg`, `error_description` or `message`, depending on endpoint)
#[derive(Debug, Default, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Row written on upsert
#[derive(Debug, Serialize)]
struct TripRow<'a> {
    owner: Uuid,
    slug: &'a str,
    data: &'a Trip,
    updated_at: DateTime<Utc>,
}

impl SupabaseGateway {
    /// Create a gateway for a project URL and publishable (anon) key
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let anon_key = anon_key.trim().to_string();
        if base_url.is_empty() || anon_key.is_empty() {
            return Err(Error::Config("URL/anon key fehlt".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Sync(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            anon_key,
            session: RwLock::new(None),
            session_store: None,
        })
    }

    /// Persist the session in `store`, restoring any session already there
    pub fn with_session_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        let restored = Session::load(store.as_ref());
        self.session = RwLock::new(restored);
        self.session_store = Some(store);
        self
    }

    fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TRIPS_TABLE)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn current_session(&self) -> Option<Session> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    fn set_session(&self, session: Option<Session>) -> Result<()> {
        if let Some(store) = &self.session_store {
            Session::store(store.as_ref(), session.as_ref())?;
        }
        if let Ok(mut slot) = self.session.write() {
            *slot = session;
        }
        Ok(())
    }

    /// Attach the API key and a bearer token (user token if given, else anon)
    fn authorized(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(token.unwrap_or(&self.anon_key))
    }

    fn store_token(&self, token: TokenResponse) -> Result<()> {
        let session = Session::issued(
            token.access_token,
            token.refresh_token,
            token.expires_in,
            token.user,
        );
        self.set_session(Some(session))
    }

    /// A valid access token, refreshing the session when it is about to expire
    async fn access_token(&self) -> Result<String> {
        let session = self
            .current_session()
            .ok_or_else(|| Error::Sync("nicht eingeloggt".to_string()))?;

        if !session.needs_refresh() {
            return Ok(session.access_token);
        }

        debug!("refreshing session");
        let response = self
            .authorized(self.client.post(self.auth_url("token?grant_type=refresh_token")), None)
            .json(&serde_json::json!({ "refresh_token": session.refresh_token }))
            .send()
            .await?;

        match auth_json::<TokenResponse>(response).await {
            Ok(token) => {
                let access = token.access_token.clone();
                self.store_token(token)?;
                Ok(access)
            }
            Err(e) => {
                self.set_session(None)?;
                Err(e)
            }
        }
    }

    async fn select_one(
        &self,
        filters: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<Option<RemoteTrip>> {
        let mut query: Vec<(&str, String)> = vec![("select", "data,updated_at".to_string())];
        query.extend(filters.iter().cloned());
        query.push(("order", "updated_at.desc".to_string()));
        query.push(("limit", "1".to_string()));

        let response = self
            .authorized(self.client.get(self.rest_url()), token)
            .query(&query)
            .send()
            .await?;

        let rows: Vec<RemoteTrip> = checked(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl SyncGateway for SupabaseGateway {
    async fn pull_public(&self, slug: &str) -> Result<Option<RemoteTrip>> {
        self.select_one(&[("slug", format!("eq.{}", slug))], None).await
    }

    async fn pull_authenticated(&self, owner: Uuid, slug: &str) -> Result<Option<RemoteTrip>> {
        let token = self.access_token().await?;
        self.select_one(
            &[
                ("owner", format!("eq.{}", owner)),
                ("slug", format!("eq.{}", slug)),
            ],
            Some(&token),
        )
        .await
    }

    async fn push(&self, owner: Uuid, slug: &str, trip: &Trip) -> Result<DateTime<Utc>> {
        let token = self.access_token().await?;
        let updated_at = Utc::now();
        let row = TripRow {
            owner,
            slug,
            data: trip,
            updated_at,
        };

        let response = self
            .authorized(self.client.post(self.rest_url()), Some(&token))
            .query(&[("on_conflict", "owner,slug")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row])
            .send()
            .await?;
        checked(response).await?;

        Ok(updated_at)
    }

    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionState> {
        let response = self
            .authorized(self.client.post(self.auth_url("token?grant_type=password")), None)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let token: TokenResponse = auth_json(response).await?;
        self.store_token(token)?;
        info!(email, "signed in");
        Ok(self.session_state())
    }

    /// Register a new account
    ///
    /// Projects with email confirmation enabled return no session until the
    /// address is confirmed.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp> {
        let response = self
            .authorized(self.client.post(self.auth_url("signup")), None)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let body: serde_json::Value = auth_json(response).await?;
        match serde_json::from_value::<TokenResponse>(body) {
            Ok(token) => {
                self.store_token(token)?;
                Ok(SignUp::SignedIn)
            }
            Err(_) => Ok(SignUp::ConfirmationPending),
        }
    }

    /// Sign out locally and revoke the session remotely (best effort)
    async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.current_session() {
            let result = self
                .authorized(self.client.post(self.auth_url("logout")), Some(&session.access_token))
                .send()
                .await;
            if let Err(e) = result {
                debug!("remote logout failed: {}", e);
            }
        }
        self.set_session(None)
    }

    fn session_state(&self) -> SessionState {
        match self.current_session() {
            Some(session) => SessionState {
                signed_in: true,
                owner_id: Some(session.user.id),
                email: session.user.email,
            },
            None => SessionState::default(),
        }
    }
}

/// Fail on non-success status, keeping the body as the message
async fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Sync(format!("remote returned {}: {}", status, body.trim())))
}

/// Decode an auth response, surfacing the service's error message
async fn auth_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body: AuthErrorBody = response.json().await.unwrap_or_default();
    let message = body
        .msg
        .or(body.error_description)
        .or(body.message)
        .unwrap_or_else(|| status.to_string());
    Err(Error::Sync(message))
}
