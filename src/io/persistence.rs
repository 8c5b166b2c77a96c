use serde_json::Value;

use super::storage::{Storage, StorageError};
use crate::domain::{default_document, validate_document};

/// Records written under any other version of this prefix are discarded.
pub const STORAGE_KEY_PREFIX: &str = "portfolio_content_";
pub const SCHEMA_VERSION: &str = "v2";

pub fn storage_key() -> String {
    format!("{STORAGE_KEY_PREFIX}{SCHEMA_VERSION}")
}

/// Where the document handed out by [`Persistence::load`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    Stored,
    DefaultMissing,
    DefaultCorrupt { reason: String },
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub document: Value,
    pub origin: LoadOrigin,
}

/// Result of writing the document out. Failures never propagate as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { bytes: usize },
    Failed { warning: String },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            SaveOutcome::Saved { .. } => None,
            SaveOutcome::Failed { warning } => Some(warning),
        }
    }
}

/// Loads and saves the content document under the versioned storage key.
#[derive(Debug)]
pub struct Persistence<S> {
    storage: S,
    key: String,
}

impl<S: Storage> Persistence<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key: storage_key(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Reads the stored document, falling back to the default on any problem.
    pub fn load(&mut self) -> Loaded {
        self.purge_stale_versions();
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "no stored document; serving default");
                return Loaded {
                    document: default_document(),
                    origin: LoadOrigin::DefaultMissing,
                };
            }
            Err(err) => return Self::corrupt(format!("storage read failed: {err}")),
        };
        let document = match serde_json::from_str::<Value>(&raw) {
            Ok(document) => document,
            Err(err) => return Self::corrupt(format!("record is not valid JSON: {err}")),
        };
        if let Err(violation) = validate_document(&document) {
            return Self::corrupt(format!("record does not match the content shape: {violation}"));
        }
        tracing::debug!(key = %self.key, bytes = raw.len(), "loaded stored document");
        Loaded {
            document,
            origin: LoadOrigin::Stored,
        }
    }

    fn corrupt(reason: String) -> Loaded {
        tracing::warn!(%reason, "discarding stored document; serving default");
        Loaded {
            document: default_document(),
            origin: LoadOrigin::DefaultCorrupt { reason },
        }
    }

    /// Serializes the whole document under the storage key.
    pub fn save(&mut self, document: &Value) -> SaveOutcome {
        let payload = match serde_json::to_string(document) {
            Ok(payload) => payload,
            Err(err) => return Self::failed(format!("could not serialize content: {err}")),
        };
        match self.storage.set_item(&self.key, &payload) {
            Ok(()) => SaveOutcome::Saved {
                bytes: payload.len(),
            },
            Err(StorageError::QuotaExceeded { .. }) => Self::failed(
                "Storage is full; large inline images may not be saved. Changes stay in this session only."
                    .to_string(),
            ),
            Err(err) => Self::failed(format!("could not save content: {err}")),
        }
    }

    fn failed(warning: String) -> SaveOutcome {
        tracing::warn!(%warning, "content was not persisted");
        SaveOutcome::Failed { warning }
    }

    /// Drops the current record so the next load serves the default.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.remove_item(&self.key)
    }

    /// Removes records written under other schema versions. Returns the removed keys.
    pub fn purge_stale_versions(&mut self) -> Vec<String> {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(err) => {
                tracing::warn!(error = %err, "could not list storage keys");
                return Vec::new();
            }
        };
        let mut removed = Vec::new();
        for key in keys {
            if !key.starts_with(STORAGE_KEY_PREFIX) || key == self.key {
                continue;
            }
            match self.storage.remove_item(&key) {
                Ok(()) => {
                    tracing::debug!(%key, "discarded record from an older schema version");
                    removed.push(key);
                }
                Err(err) => tracing::warn!(%key, error = %err, "could not discard stale record"),
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStorage;

    #[test]
    fn empty_storage_serves_default() {
        let mut persistence = Persistence::new(MemoryStorage::new());
        let loaded = persistence.load();
        assert_eq!(loaded.origin, LoadOrigin::DefaultMissing);
        assert_eq!(loaded.document, default_document());
    }

    #[test]
    fn saved_document_loads_back() {
        let mut persistence = Persistence::new(MemoryStorage::new());
        let mut document = default_document();
        document["contact"]["email"] = Value::String("ada@example.com".into());
        assert!(persistence.save(&document).is_saved());
        let loaded = persistence.load();
        assert_eq!(loaded.origin, LoadOrigin::Stored);
        assert_eq!(loaded.document, document);
    }

    #[test]
    fn unparsable_and_misshapen_records_fall_back() {
        let mut storage = MemoryStorage::new();
        storage.set_item(&storage_key(), "{not json").unwrap();
        let loaded = Persistence::new(storage).load();
        assert!(matches!(loaded.origin, LoadOrigin::DefaultCorrupt { .. }));
        assert_eq!(loaded.document, default_document());

        let mut storage = MemoryStorage::new();
        storage.set_item(&storage_key(), r#"{"hero": 1}"#).unwrap();
        let loaded = Persistence::new(storage).load();
        assert!(matches!(loaded.origin, LoadOrigin::DefaultCorrupt { .. }));
    }

    #[test]
    fn quota_failure_is_reported_not_raised() {
        let mut persistence = Persistence::new(MemoryStorage::new().with_quota(64));
        let outcome = persistence.save(&default_document());
        assert!(outcome.warning().unwrap().starts_with("Storage is full"));
        assert_eq!(persistence.load().origin, LoadOrigin::DefaultMissing);
    }

    #[test]
    fn stale_versions_are_discarded_on_load() {
        let mut storage = MemoryStorage::new();
        storage.set_item("portfolio_content_v1", "{}").unwrap();
        storage.set_item("unrelated", "keep").unwrap();
        let mut persistence = Persistence::new(storage);
        persistence.save(&default_document());
        persistence.load();
        let keys = persistence.storage().keys().unwrap();
        assert_eq!(keys, vec!["unrelated".to_string(), storage_key()]);
    }

    #[test]
    fn clear_removes_current_record() {
        let mut persistence = Persistence::new(MemoryStorage::new());
        persistence.save(&default_document());
        persistence.clear().unwrap();
        assert_eq!(persistence.load().origin, LoadOrigin::DefaultMissing);
    }
}
