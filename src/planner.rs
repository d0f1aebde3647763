//! Planner controller
//!
//! Glue between the trip store, the per-user sync settings and the remote
//! gateway. Both front ends (CLI and HTTP) drive the planner; nothing else
//! mutates the trip.

use crate::config::{Config, SyncConfig};
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::route::MapLinks;
use crate::storage::{FileStore, KeyValueStore};
use crate::store::{Command, TripStore};
use crate::sync::{
    push_trip, AutoSync, RemoteTrip, SessionState, SignUp, StatusBoard, SupabaseGateway,
    SyncGateway, SyncSettings, SyncStatus,
};
use crate::trip::Trip;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Trip store plus everything needed to mirror it remotely
pub struct Planner {
    store: TripStore,
    kv: Arc<dyn KeyValueStore>,
    defaults: SyncConfig,
    settings: SyncSettings,
    gateway: Option<Arc<dyn SyncGateway>>,
    auto_sync: Option<AutoSync>,
    board: StatusBoard,
    map_center: Coordinates,
}

impl Planner {
    /// Open the planner on the configured key-value directory
    pub fn open(config: &Config) -> Result<Self> {
        let kv: Arc<dyn KeyValueStore> = match &config.storage.data_dir {
            Some(dir) => Arc::new(FileStore::new(dir)),
            None => Arc::new(FileStore::open_default()?),
        };
        Self::new(kv, config)
    }

    /// Boot the store and connect to the remote if it is configured
    pub fn new(kv: Arc<dyn KeyValueStore>, config: &Config) -> Result<Self> {
        let store = TripStore::load(Arc::clone(&kv), config.map.fallback_center())?;
        let settings = SyncSettings::resolve(SyncSettings::load(kv.as_ref()), &config.sync);
        let gateway = connect(&settings, &kv);

        let mut planner = Self {
            store: store.with_fallback(config.map.fallback_center()),
            kv,
            defaults: config.sync.clone(),
            settings,
            gateway,
            auto_sync: None,
            board: StatusBoard::new(),
            map_center: config.map.fallback_center(),
        };
        planner.rearm();
        Ok(planner)
    }

    /// Assemble a planner from parts, with an explicit gateway
    pub fn with_gateway(
        store: TripStore,
        kv: Arc<dyn KeyValueStore>,
        config: &Config,
        settings: SyncSettings,
        gateway: Option<Arc<dyn SyncGateway>>,
    ) -> Self {
        let mut planner = Self {
            store: store.with_fallback(config.map.fallback_center()),
            kv,
            defaults: config.sync.clone(),
            settings,
            gateway,
            auto_sync: None,
            board: StatusBoard::new(),
            map_center: config.map.fallback_center(),
        };
        planner.rearm();
        planner
    }

    pub fn store(&self) -> &TripStore {
        &self.store
    }

    pub fn trip(&self) -> &Trip {
        self.store.trip()
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Most recent sync status, if any action has run
    pub fn status(&self) -> Option<SyncStatus> {
        self.board.latest()
    }

    pub fn session_state(&self) -> SessionState {
        self.gateway
            .as_ref()
            .map(|g| g.session_state())
            .unwrap_or_default()
    }

    /// Apply a command; document changes are scheduled for auto-sync
    pub fn dispatch(&mut self, command: Command) -> Result<bool> {
        let changed = self.store.apply(command)?;
        if changed {
            if let Some(auto_sync) = &self.auto_sync {
                auto_sync.notify(self.store.trip());
            }
        }
        Ok(changed)
    }

    /// Map links for a day (or the focused day, or the default center)
    pub fn map_links(&self, day_id: Option<&str>) -> Result<MapLinks> {
        let day = match day_id {
            Some(id) => Some(
                self.store
                    .trip()
                    .day(id)
                    .ok_or_else(|| Error::NotFound(format!("day {}", id)))?,
            ),
            None => self.store.focused_day(),
        };
        Ok(match day {
            Some(day) => MapLinks::for_day(Some(day)),
            None => MapLinks::for_point(self.map_center),
        })
    }

    /// Push the current trip right away
    pub async fn push_now(&self) -> SyncStatus {
        self.prepare_push().send().await
    }

    /// Snapshot everything a push needs
    ///
    /// The returned request owns its data, so the caller can release any
    /// lock on the planner before awaiting the network.
    pub fn prepare_push(&self) -> PushRequest {
        PushRequest {
            gateway: self.gateway.clone(),
            slug: self.settings.slug.clone(),
            trip: self.store.trip().clone(),
            board: self.board.clone(),
        }
    }

    /// Replace the local trip with the signed-in user's remote copy
    ///
    /// Remote problems become a status; only local persistence errors fail.
    pub async fn pull_now(&mut self) -> Result<SyncStatus> {
        match self.prepare_pull() {
            Ok(request) => {
                let response = request.fetch().await;
                self.finish_pull(response)
            }
            Err(status) => Ok(status),
        }
    }

    /// Check the pull preconditions and capture gateway, owner and slug
    ///
    /// A failed precondition is reported and returned as the `Err` status.
    pub fn prepare_pull(&self) -> std::result::Result<PullRequest, SyncStatus> {
        let Some(gateway) = self.gateway.clone() else {
            return Err(self.report(SyncStatus::warn("URL/anon key fehlt")));
        };
        let slug = self.settings.slug.trim().to_string();
        if slug.is_empty() {
            return Err(self.report(SyncStatus::warn("Trip-ID fehlt")));
        }
        let Some(owner) = gateway.session_state().owner_id else {
            return Err(self.report(SyncStatus::warn("Bitte erst einloggen")));
        };
        Ok(PullRequest {
            gateway,
            owner,
            slug,
        })
    }

    /// Swap in a fetched remote copy and report the outcome
    pub fn finish_pull(&mut self, response: PullResponse) -> Result<SyncStatus> {
        let PullResponse { slug, result } = response;
        let status = match result {
            Err(e) => {
                warn!(slug = %slug, "pull failed: {}", e);
                SyncStatus::warn(format!("Laden fehlgeschlagen: {}", e))
            }
            Ok(None) => SyncStatus::warn("Kein Trip gefunden (Trip-ID korrekt?)"),
            Ok(Some(row)) => {
                self.store.replace(Trip::normalize(row.data))?;
                info!(slug = %slug, days = self.store.trip().days.len(), "pulled trip");
                let when = row
                    .updated_at
                    .map(|t| {
                        t.with_timezone(&chrono::Local)
                            .format("%d.%m.%Y, %H:%M:%S")
                            .to_string()
                    })
                    .unwrap_or_else(|| "unbekannt".to_string());
                SyncStatus::ok(format!("Geladen ({})", when))
            }
        };
        Ok(self.report(status))
    }

    /// Load the newest public row for the slug, if configured to
    ///
    /// Returns whether a remote trip replaced the local one. Failures are
    /// silent: the local copy simply stays.
    pub async fn autoload_public(&mut self) -> Result<bool> {
        if !self.defaults.autoload_public || self.settings.slug.is_empty() {
            return Ok(false);
        }
        let Some(gateway) = self.gateway.clone() else {
            return Ok(false);
        };

        match gateway.pull_public(&self.settings.slug).await {
            Ok(Some(row)) => {
                self.store.replace(Trip::normalize(row.data))?;
                info!(slug = %self.settings.slug, "auto-loaded public trip");
                self.report(SyncStatus::ok("Auto-Load aktiv (geladen)"));
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                warn!("public auto-load failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Describe the current session
    pub fn refresh_session_status(&self) -> SyncStatus {
        let status = match &self.gateway {
            None => SyncStatus::warn("URL/anon key fehlt"),
            Some(gateway) => session_status(&gateway.session_state()),
        };
        self.report(status)
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<SyncStatus> {
        let Some(gateway) = self.credentials_gateway(email, password)? else {
            return Ok(self.report(SyncStatus::warn("E-Mail/Passwort fehlt")));
        };

        let status = match gateway.sign_up(email.trim(), password).await {
            Ok(SignUp::SignedIn) => session_status(&gateway.session_state()),
            Ok(SignUp::ConfirmationPending) => {
                SyncStatus::ok("Registriert. Falls Bestätigung nötig: E-Mail prüfen.")
            }
            Err(e) => SyncStatus::warn(format!("Signup fehlgeschlagen: {}", e)),
        };
        Ok(self.report(status))
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<SyncStatus> {
        let Some(gateway) = self.credentials_gateway(email, password)? else {
            return Ok(self.report(SyncStatus::warn("E-Mail/Passwort fehlt")));
        };

        let status = match gateway.sign_in(email.trim(), password).await {
            Ok(state) => session_status(&state),
            Err(e) => SyncStatus::warn(format!("Login fehlgeschlagen: {}", e)),
        };
        Ok(self.report(status))
    }

    pub async fn sign_out(&self) -> Result<SyncStatus> {
        if let Some(gateway) = &self.gateway {
            gateway.sign_out().await?;
        }
        Ok(self.report(SyncStatus::warn("nicht eingeloggt")))
    }

    /// Validate credentials, remember the email and hand out the gateway
    fn credentials_gateway(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<Option<Arc<dyn SyncGateway>>> {
        if email.trim().is_empty() || password.is_empty() {
            return Ok(None);
        }
        let Some(gateway) = self.gateway.clone() else {
            return Err(Error::Config("URL/anon key fehlt".to_string()));
        };
        if self.settings.email != email.trim() {
            self.settings.email = email.trim().to_string();
            self.settings.save(self.kv.as_ref())?;
        }
        Ok(Some(gateway))
    }

    /// Toggle auto-sync and persist the choice
    pub fn set_auto_sync(&mut self, enabled: bool) -> Result<SyncStatus> {
        self.settings.auto = enabled;
        self.settings.save(self.kv.as_ref())?;
        self.rearm();

        let status = if enabled {
            SyncStatus::ok("Auto-Sync aktiv (speichert bei Änderungen)")
        } else {
            SyncStatus::warn("Auto-Sync aus")
        };
        Ok(self.report(status))
    }

    /// Change endpoint, key, email or slug and persist them
    ///
    /// The gateway is rebuilt when the endpoint changed.
    pub fn update_settings(&mut self, update: impl FnOnce(&mut SyncSettings)) -> Result<()> {
        let mut next = self.settings.clone();
        update(&mut next);
        next.url = next.url.trim().to_string();
        next.anon_key = next.anon_key.trim().to_string();
        next.slug = next.slug.trim().to_string();
        next.email = next.email.trim().to_string();
        next.save(self.kv.as_ref())?;

        let endpoint_changed = next.url != self.settings.url || next.anon_key != self.settings.anon_key;
        self.settings = SyncSettings::resolve(Some(next), &self.defaults);
        if endpoint_changed {
            self.gateway = connect(&self.settings, &self.kv);
        }
        self.rearm();
        Ok(())
    }

    /// Wait for a scheduled auto-sync push to finish
    pub async fn flush(&self) {
        if let Some(auto_sync) = &self.auto_sync {
            auto_sync.flush().await;
        }
    }

    /// Rebuild the auto-sync scheduler from the current settings
    fn rearm(&mut self) {
        self.auto_sync = match (&self.gateway, self.settings.auto) {
            (Some(gateway), true) => Some(AutoSync::new(
                Arc::clone(gateway),
                self.settings.slug.clone(),
                self.defaults.debounce_ms,
                self.board.clone(),
            )),
            _ => None,
        };
    }

    fn report(&self, status: SyncStatus) -> SyncStatus {
        self.board.post(status.clone());
        status
    }
}

/// A manual push detached from the planner
pub struct PushRequest {
    gateway: Option<Arc<dyn SyncGateway>>,
    slug: String,
    trip: Trip,
    board: StatusBoard,
}

impl PushRequest {
    /// Upload the snapshot and post the outcome
    pub async fn send(self) -> SyncStatus {
        let status = match &self.gateway {
            Some(gateway) => push_trip(gateway.as_ref(), &self.slug, &self.trip).await,
            None => SyncStatus::warn("URL/anon key fehlt"),
        };
        self.board.post(status.clone());
        status
    }
}

/// A manual pull detached from the planner
pub struct PullRequest {
    gateway: Arc<dyn SyncGateway>,
    owner: Uuid,
    slug: String,
}

impl PullRequest {
    pub async fn fetch(self) -> PullResponse {
        let result = self.gateway.pull_authenticated(self.owner, &self.slug).await;
        PullResponse {
            slug: self.slug,
            result,
        }
    }
}

/// Remote answer to a [`PullRequest`], applied with [`Planner::finish_pull`]
pub struct PullResponse {
    slug: String,
    result: Result<Option<RemoteTrip>>,
}

/// Gateway for the configured endpoint, if both URL and key are present
fn connect(settings: &SyncSettings, kv: &Arc<dyn KeyValueStore>) -> Option<Arc<dyn SyncGateway>> {
    if !settings.has_endpoint() {
        return None;
    }
    match SupabaseGateway::new(&settings.url, &settings.anon_key) {
        Ok(gateway) => Some(Arc::new(gateway.with_session_store(Arc::clone(kv)))),
        Err(e) => {
            warn!("remote sync disabled: {}", e);
            None
        }
    }
}

fn session_status(state: &SessionState) -> SyncStatus {
    if state.signed_in {
        SyncStatus::ok(format!(
            "eingeloggt: {}",
            state.email.as_deref().unwrap_or("User")
        ))
    } else {
        SyncStatus::warn("nicht eingeloggt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::storage::{SYNC_SETTINGS_KEY, TRIP_KEY};
    use crate::storage::MemoryStore;
    use crate::sync::testing::FakeGateway;
    use serde_json::json;

    const SLUG: &str = "frankreich-2026";

    fn planner_with(gateway: Arc<FakeGateway>, auto: bool) -> Planner {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let store = TripStore::load(Arc::clone(&kv), Coordinates::fallback()).unwrap();
        let settings = SyncSettings {
            url: "https://demo.supabase.co".to_string(),
            anon_key: "key".to_string(),
            slug: SLUG.to_string(),
            auto,
            ..SyncSettings::default()
        };
        let mut config = Config::default();
        config.sync.debounce_ms = 10;
        Planner::with_gateway(store, kv, &config, settings, Some(gateway))
    }

    #[test]
    fn test_boot_without_remote() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let planner = Planner::new(Arc::clone(&kv), &Config::default()).unwrap();

        assert_eq!(planner.trip().days.len(), 7);
        assert!(!planner.session_state().signed_in);
        assert_eq!(planner.refresh_session_status().message, "URL/anon key fehlt");
        assert!(kv.get(TRIP_KEY).unwrap().is_some());
    }

    #[test]
    fn test_new_days_follow_map_config() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        kv.set(TRIP_KEY, r#"{"days":[]}"#).unwrap();
        let mut config = Config::default();
        config.set("map.fallback_lat", "50.1").unwrap();
        config.set("map.fallback_lng", "8.7").unwrap();

        let mut planner = Planner::new(kv, &config).unwrap();
        let center = Coordinates::new(50.1, 8.7);
        assert_eq!(planner.trip().days[0].coordinates, center);

        planner.dispatch(Command::AddDay).unwrap();
        assert_eq!(planner.trip().days[1].coordinates, center);
    }

    #[tokio::test]
    async fn test_pull_phases_run_without_planner_borrow() {
        let gateway = Arc::new(FakeGateway::signed_in());
        let owner = gateway.owner().unwrap();
        gateway.insert(owner, SLUG, json!({ "trip_title": "Remote", "days": [{ "id": "r1" }] }));
        let mut planner = planner_with(gateway, false);

        let request = planner.prepare_pull().ok().unwrap();
        // Local edits in between are allowed; the pulled copy wins
        planner
            .dispatch(Command::SetTitle {
                title: "Lokal".to_string(),
            })
            .unwrap();
        let response = request.fetch().await;
        let status = planner.finish_pull(response).unwrap();

        assert!(status.is_ok());
        assert_eq!(planner.trip().trip_title, "Remote");
        assert_eq!(planner.store().selected_id(), Some("r1"));
    }

    #[tokio::test]
    async fn test_prepare_pull_reports_missing_login() {
        let planner = planner_with(Arc::new(FakeGateway::default()), false);
        let status = planner.prepare_pull().err().unwrap();
        assert_eq!(status.message, "Bitte erst einloggen");
        assert_eq!(planner.status(), Some(status));
    }

    #[tokio::test]
    async fn test_push_without_remote_is_status() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let planner = Planner::new(kv, &Config::default()).unwrap();
        let status = planner.push_now().await;
        assert_eq!(status.message, "URL/anon key fehlt");
        assert_eq!(planner.status(), Some(status));
    }

    #[tokio::test]
    async fn test_push_and_pull() {
        let gateway = Arc::new(FakeGateway::signed_in());
        let mut planner = planner_with(gateway.clone(), false);

        planner
            .dispatch(Command::SetTitle {
                title: "Sommer".to_string(),
            })
            .unwrap();
        assert!(planner.push_now().await.is_ok());
        assert_eq!(gateway.push_count(), 1);

        planner
            .dispatch(Command::SetTitle {
                title: "Winter".to_string(),
            })
            .unwrap();
        let status = planner.pull_now().await.unwrap();
        assert!(status.is_ok(), "{}", status);
        assert!(status.message.starts_with("Geladen ("));
        assert_eq!(planner.trip().trip_title, "Sommer");
    }

    #[tokio::test]
    async fn test_pull_missing_row() {
        let gateway = Arc::new(FakeGateway::signed_in());
        let mut planner = planner_with(gateway, false);
        let before = planner.trip().clone();

        let status = planner.pull_now().await.unwrap();
        assert_eq!(status.message, "Kein Trip gefunden (Trip-ID korrekt?)");
        assert_eq!(planner.trip(), &before);
    }

    #[tokio::test]
    async fn test_pull_requires_login() {
        let gateway = Arc::new(FakeGateway::default());
        let mut planner = planner_with(gateway, false);
        let status = planner.pull_now().await.unwrap();
        assert_eq!(status.message, "Bitte erst einloggen");
    }

    #[tokio::test]
    async fn test_pull_normalizes_remote_data() {
        let gateway = Arc::new(FakeGateway::signed_in());
        let owner = gateway.owner().unwrap();
        gateway.insert(
            owner,
            SLUG,
            json!({ "trip_title": null, "days": [{ "id": "", "title": 5, "coordinates": "x" }] }),
        );
        let mut planner = planner_with(gateway, false);

        planner.pull_now().await.unwrap();
        let trip = planner.trip();
        assert_eq!(trip.trip_title, "Frankreich Roadtrip");
        assert_eq!(trip.days[0].title, "5");
        assert!(!trip.days[0].id.is_empty());
        assert_eq!(planner.store().selected_id(), Some(trip.days[0].id.as_str()));
    }

    #[tokio::test]
    async fn test_autoload_public() {
        let gateway = Arc::new(FakeGateway::default());
        gateway.insert(uuid::Uuid::new_v4(), SLUG, json!({ "trip_title": "Von unterwegs", "days": [] }));
        let mut planner = planner_with(gateway, false);

        assert!(planner.autoload_public().await.unwrap());
        assert_eq!(planner.trip().trip_title, "Von unterwegs");
        assert_eq!(planner.status().unwrap().message, "Auto-Load aktiv (geladen)");
    }

    #[tokio::test]
    async fn test_autoload_public_without_row_keeps_local() {
        let gateway = Arc::new(FakeGateway::default());
        let mut planner = planner_with(gateway, false);
        assert!(!planner.autoload_public().await.unwrap());
        assert_eq!(planner.trip().days.len(), 7);
        assert!(planner.status().is_none());
    }

    #[tokio::test]
    async fn test_dispatch_feeds_auto_sync() {
        let gateway = Arc::new(FakeGateway::signed_in());
        let mut planner = planner_with(gateway.clone(), true);

        planner.dispatch(Command::AddDay).unwrap();
        planner.dispatch(Command::AddDay).unwrap();
        planner.flush().await;

        assert_eq!(gateway.push_count(), 1);
        assert_eq!(gateway.pushes.lock().unwrap()[0].days.len(), 9);
        assert!(planner.status().unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_selection_does_not_sync() {
        let gateway = Arc::new(FakeGateway::signed_in());
        let mut planner = planner_with(gateway.clone(), true);
        let id = planner.trip().days[2].id.clone();

        planner.dispatch(Command::SelectDay { id }).unwrap();
        planner.flush().await;
        assert_eq!(gateway.push_count(), 0);
    }

    #[tokio::test]
    async fn test_toggle_auto_sync() {
        let gateway = Arc::new(FakeGateway::signed_in());
        let mut planner = planner_with(gateway.clone(), false);

        planner.dispatch(Command::AddDay).unwrap();
        planner.flush().await;
        assert_eq!(gateway.push_count(), 0);

        let status = planner.set_auto_sync(true).unwrap();
        assert!(status.is_ok());
        assert!(planner.kv.get(SYNC_SETTINGS_KEY).unwrap().unwrap().contains("\"auto\":true"));

        planner.dispatch(Command::AddDay).unwrap();
        planner.flush().await;
        assert_eq!(gateway.push_count(), 1);

        assert_eq!(planner.set_auto_sync(false).unwrap().message, "Auto-Sync aus");
    }

    #[tokio::test]
    async fn test_sign_in_flow() {
        let gateway = Arc::new(FakeGateway::default());
        let mut planner = planner_with(gateway, false);

        let status = planner.sign_in("", "geheim").await.unwrap();
        assert_eq!(status.message, "E-Mail/Passwort fehlt");

        let status = planner.sign_in("reise@example.com", "falsch").await.unwrap();
        assert!(status.message.starts_with("Login fehlgeschlagen"));

        let status = planner.sign_in("reise@example.com", "geheim").await.unwrap();
        assert!(status.is_ok());
        assert!(planner.session_state().signed_in);
        assert_eq!(planner.settings().email, "reise@example.com");

        let status = planner.sign_out().await.unwrap();
        assert_eq!(status.message, "nicht eingeloggt");
        assert!(!planner.session_state().signed_in);
    }

    #[test]
    fn test_update_settings_persists() {
        let gateway = Arc::new(FakeGateway::default());
        let mut planner = planner_with(gateway, false);

        planner
            .update_settings(|s| s.slug = " italien-2027 ".to_string())
            .unwrap();
        assert_eq!(planner.settings().slug, "italien-2027");
        let stored = SyncSettings::load(planner.kv.as_ref()).unwrap();
        assert_eq!(stored.slug, "italien-2027");
    }

    #[test]
    fn test_map_links() {
        let gateway = Arc::new(FakeGateway::default());
        let planner = planner_with(gateway, false);

        let first = planner.map_links(None).unwrap();
        let paris = &planner.trip().days[0];
        assert_eq!(first, MapLinks::for_day(Some(paris)));

        assert!(matches!(planner.map_links(Some("nope")), Err(Error::NotFound(_))));
    }
}
