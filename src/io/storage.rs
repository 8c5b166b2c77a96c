use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use thiserror::Error;

/// Characters kept verbatim when a storage key becomes a file name.
const KEY_FILENAME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-').remove(b'.');
const RECORD_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota exceeded: record needs {needed} bytes, {available} of {limit} available")]
    QuotaExceeded {
        needed: usize,
        available: usize,
        limit: usize,
    },
    #[error("storage I/O failed for key '{key}'")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Durable string key/value storage, shaped like a browser's local storage.
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }
}

fn check_quota(
    limit: Option<usize>,
    used_elsewhere: usize,
    needed: usize,
) -> Result<(), StorageError> {
    let Some(limit) = limit else {
        return Ok(());
    };
    let available = limit.saturating_sub(used_elsewhere);
    if needed > available {
        return Err(StorageError::QuotaExceeded {
            needed,
            available,
            limit,
        });
    }
    Ok(())
}

/// In-process storage. Keys keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: IndexMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the combined size of keys and values, in bytes.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    fn used_excluding(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, value)| existing.len() + value.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(self.quota, self.used_excluding(key), key.len() + value.len())?;
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.shift_remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.items.keys().cloned().collect())
    }
}

/// Directory-backed storage: one `<percent-encoded key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    quota: Option<usize>,
}

impl FileStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            quota: None,
        }
    }

    /// Caps the combined size of keys and record contents, in bytes.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, key: &str) -> PathBuf {
        let name = utf8_percent_encode(key, KEY_FILENAME).to_string();
        self.root.join(format!("{name}.{RECORD_EXTENSION}"))
    }

    fn used_excluding(&self, key: &str) -> Result<usize, StorageError> {
        let mut used = 0usize;
        for (existing, path) in self.records(key)? {
            if existing == key {
                continue;
            }
            let len = fs::metadata(&path)
                .map_err(|source| StorageError::Io {
                    key: existing.clone(),
                    source,
                })?
                .len();
            let len = usize::try_from(len).unwrap_or(usize::MAX);
            used = used.saturating_add(existing.len()).saturating_add(len);
        }
        Ok(used)
    }

    /// Decoded keys and file paths of every record under the root.
    fn records(&self, key: &str) -> Result<Vec<(String, PathBuf)>, StorageError> {
        let reader = match fs::read_dir(&self.root) {
            Ok(reader) => reader,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source,
                });
            }
        };
        let mut records = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|source| StorageError::Io {
                key: key.to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let decoded = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| percent_decode_str(stem).decode_utf8().ok())
                .map(|key| key.into_owned());
            if let Some(decoded) = decoded {
                records.push((decoded, path));
            }
        }
        records.sort();
        Ok(records)
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.record_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.quota.is_some() {
            check_quota(self.quota, self.used_excluding(key)?, key.len() + value.len())?;
        }
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.root).map_err(io_err)?;
        // Write-then-rename so a failed write never truncates the old record.
        let target = self.record_path(key);
        let staging = target.with_extension("tmp");
        fs::write(&staging, value).map_err(io_err)?;
        fs::rename(&staging, &target).map_err(io_err)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.record_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let keys = self.records("*")?.into_iter().map(|(key, _)| key).collect();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trips_and_lists_keys_in_order() {
        let mut storage = MemoryStorage::new();
        storage.set_item("b", "2").unwrap();
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.keys().unwrap(), vec!["b".to_string(), "a".to_string()]);
        storage.remove_item("b").unwrap();
        assert_eq!(storage.get_item("b").unwrap(), None);
    }

    #[test]
    fn memory_quota_rejects_oversized_records_and_keeps_previous_value() {
        let mut storage = MemoryStorage::new().with_quota(16);
        storage.set_item("k", "small").unwrap();
        let err = storage.set_item("k", &"x".repeat(64)).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 16, .. }));
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn file_storage_encodes_keys_into_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("store"));
        assert_eq!(storage.get_item("portfolio/v2").unwrap(), None);
        storage.set_item("portfolio/v2", "{}").unwrap();
        assert!(dir.path().join("store").join("portfolio%2Fv2.json").exists());
        assert_eq!(storage.keys().unwrap(), vec!["portfolio/v2".to_string()]);
        assert_eq!(storage.get_item("portfolio/v2").unwrap().as_deref(), Some("{}"));
        storage.remove_item("portfolio/v2").unwrap();
        storage.remove_item("portfolio/v2").unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }

    #[test]
    fn file_quota_counts_other_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path()).with_quota(12);
        storage.set_item("a", "123456").unwrap();
        assert!(matches!(
            storage.set_item("b", "123456"),
            Err(StorageError::QuotaExceeded { needed: 7, available: 5, .. })
        ));
        storage.set_item("a", "12345678901").unwrap();
    }

    #[test]
    fn both_backends_charge_keys_and_values_alike() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = FileStorage::new(dir.path()).with_quota(20);
        let mut memory = MemoryStorage::new().with_quota(20);
        let backends: [&mut dyn Storage; 2] = [&mut files, &mut memory];
        for storage in backends {
            storage.set_item("key", "0123456789").unwrap();
            let err = storage.set_item("other", "0123").unwrap_err();
            assert!(matches!(
                err,
                StorageError::QuotaExceeded { needed: 9, available: 7, limit: 20 }
            ));
            storage.set_item("next", "012").unwrap();
        }
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_records_fail_the_quota_check() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        symlink(dir.path().join("gone"), dir.path().join("dangling.json")).unwrap();
        let mut storage = FileStorage::new(dir.path()).with_quota(1024);
        let err = storage.set_item("k", "v").unwrap_err();
        assert!(matches!(err, StorageError::Io { ref key, .. } if key == "dangling"));
        assert!(FileStorage::new(dir.path()).set_item("k", "v").is_ok());
    }
}
