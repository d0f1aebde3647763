//! Per-user sync settings
//!
//! Stored as a small JSON blob next to the trip. Holds no secrets: the anon
//! key is a publishable key and the password is never written.

use crate::config::SyncConfig;
use crate::constants::storage::SYNC_SETTINGS_KEY;
use crate::error::Result;
use crate::storage::{load_json, save_json, KeyValueStore};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Remote endpoint, identifiers and the auto-sync toggle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(rename = "sbUrl", default)]
    pub url: String,

    #[serde(rename = "sbAnon", default)]
    pub anon_key: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub slug: String,

    /// Push automatically after local edits
    #[serde(default)]
    pub auto: bool,
}

impl SyncSettings {
    /// Stored settings, or `None` on first run
    ///
    /// A corrupt blob is logged and ignored.
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        match load_json(store, SYNC_SETTINGS_KEY) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("ignoring sync settings: {}", e);
                None
            }
        }
    }

    /// Persist the settings
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        save_json(store, SYNC_SETTINGS_KEY, self)
    }

    /// Stored settings overlaid on the deployment defaults
    ///
    /// Non-empty stored values win; blanks are filled from the config.
    pub fn resolve(stored: Option<Self>, defaults: &SyncConfig) -> Self {
        let stored = stored.unwrap_or_default();
        let pick = |own: String, fallback: &str| {
            let own = own.trim().to_string();
            if own.is_empty() {
                fallback.trim().to_string()
            } else {
                own
            }
        };

        Self {
            url: pick(stored.url, &defaults.url),
            anon_key: pick(stored.anon_key, &defaults.anon_key),
            email: stored.email.trim().to_string(),
            slug: pick(stored.slug, &defaults.slug),
            auto: stored.auto,
        }
    }

    /// Endpoint and key are both present
    pub fn has_endpoint(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn defaults() -> SyncConfig {
        SyncConfig {
            url: "https://demo.supabase.co".to_string(),
            anon_key: "sb_publishable_demo".to_string(),
            slug: "frankreich-2026".to_string(),
            ..SyncConfig::default()
        }
    }

    #[test]
    fn test_first_run_uses_config() {
        let settings = SyncSettings::resolve(None, &defaults());
        assert_eq!(settings.url, "https://demo.supabase.co");
        assert_eq!(settings.slug, "frankreich-2026");
        assert!(!settings.auto);
        assert!(settings.has_endpoint());
    }

    #[test]
    fn test_stored_values_win() {
        let stored = SyncSettings {
            slug: " italien-2027 ".to_string(),
            auto: true,
            ..SyncSettings::default()
        };
        let settings = SyncSettings::resolve(Some(stored), &defaults());
        assert_eq!(settings.slug, "italien-2027");
        assert_eq!(settings.anon_key, "sb_publishable_demo");
        assert!(settings.auto);
    }

    #[test]
    fn test_blob_uses_legacy_keys() {
        let kv = MemoryStore::new();
        kv.set(
            SYNC_SETTINGS_KEY,
            r#"{"sbUrl":"https://x.supabase.co","sbAnon":"k","email":"a@b.c","slug":"s","auto":true}"#,
        )
        .unwrap();

        let settings = SyncSettings::load(&kv).unwrap();
        assert_eq!(settings.url, "https://x.supabase.co");
        assert!(settings.auto);

        settings.save(&kv).unwrap();
        assert!(kv.get(SYNC_SETTINGS_KEY).unwrap().unwrap().contains("\"sbAnon\""));
    }

    #[test]
    fn test_corrupt_blob_is_ignored() {
        let kv = MemoryStore::new();
        kv.set(SYNC_SETTINGS_KEY, "[").unwrap();
        assert_eq!(SyncSettings::load(&kv), None);
    }
}
