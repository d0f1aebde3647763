//! Local key-value persistence
//!
//! The planner keeps everything it owns locally under a handful of string
//! keys (trip document, sync settings, session). Values are opaque JSON.
//! A missing key is a valid first-run state, not an error.
//!
//! Default location: ~/.local/share/roadtrip-planner/<key>.json

pub mod file;
pub mod memory;

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Synchronous string key-value slot store
///
/// Writes are expected to be durable by the time `set` returns.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read and deserialize a JSON value
///
/// Unparseable content is reported as a storage error so callers can decide
/// whether to fall back.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| Error::Storage(format!("Failed to parse {}: {}", key, e))),
        None => Ok(None),
    }
}

/// Serialize and write a JSON value
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| Error::Storage(format!("Failed to serialize {}: {}", key, e)))?;
    store.set(key, &raw)
}

/// Validate that a key is safe for use as a filename
///
/// Rejects empty keys, path separators, `..`, and control characters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::Storage("storage key cannot be empty".to_string()));
    }
    if key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(Error::Storage(format!(
            "storage key contains invalid characters: {:?}",
            key
        )));
    }
    if key.chars().any(|c| c.is_control()) {
        return Err(Error::Storage(format!(
            "storage key contains control characters: {:?}",
            key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Blob {
        slug: String,
        auto: bool,
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        assert_eq!(load_json::<Blob>(&store, "blob").unwrap(), None);

        let blob = Blob {
            slug: "frankreich-2026".to_string(),
            auto: true,
        };
        save_json(&store, "blob", &blob).unwrap();
        assert_eq!(load_json::<Blob>(&store, "blob").unwrap(), Some(blob));
    }

    #[test]
    fn test_load_json_reports_garbage() {
        let store = MemoryStore::new();
        store.set("blob", "{oops").unwrap();
        assert!(matches!(load_json::<Blob>(&store, "blob"), Err(Error::Storage(_))));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("fr-roadtrip-v4").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("a\0b").is_err());
    }
}
