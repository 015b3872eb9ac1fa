//! Durable client storage for the bearer token.
//!
//! The browser equivalent is `localStorage`: synchronous, local, string
//! keys and values. [`TokenStorage`] captures exactly that surface.
//! Only the session store writes to it.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::StorageError;

/// Synchronous key/value persistence.
pub trait TokenStorage: Send + Sync + 'static {
    /// Reads the value under `key`. `Ok(None)` if it was never set.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// In-process storage. Clones share the same map, so a test can keep a
/// handle and inspect what the store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage that already holds `key = value`, as if a previous
    /// run had logged in.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .lock()
            .insert(key.to_string(), value.to_string());
        storage
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding this lock cannot leave the map half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// Storage backed by a JSON object on disk, for native clients.
///
/// Every write replaces the file atomically (write to a sibling temp file,
/// then rename), so a crash never leaves a half-written token behind.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Uses `path` as the backing file. The file is created on first write.
    ///
    /// Reads of a corrupt file fail with [`StorageError::Corrupt`]; the next
    /// `set` or `delete` replaces it with a valid one.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("file storage lock poisoned".into()))?;
        let (mut entries, repair) = match self.read_all() {
            Ok(entries) => (entries, false),
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "storage file is corrupt, rewriting it"
                );
                (BTreeMap::new(), true)
            }
            Err(e) => return Err(e),
        };
        if apply(&mut entries) || repair {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    /// A fresh path under the system temp dir, unique per test.
    fn temp_path(name: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir()
            .join(format!("gatehouse-storage-{}-{name}-{n}", std::process::id()))
            .join("session.json")
    }

    // =====================================================================
    // MemoryStorage
    // =====================================================================

    #[test]
    fn test_memory_get_missing_returns_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("token").unwrap(), None);
    }

    #[test]
    fn test_memory_set_then_get() {
        let storage = MemoryStorage::new();
        storage.set("token", "abc").unwrap();
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_memory_clones_share_entries() {
        let storage = MemoryStorage::new();
        let observer = storage.clone();

        storage.set("token", "abc").unwrap();

        assert_eq!(observer.get("token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_memory_delete_is_idempotent() {
        let storage = MemoryStorage::with_entry("token", "abc");
        storage.delete("token").unwrap();
        storage.delete("token").unwrap();
        assert_eq!(storage.get("token").unwrap(), None);
    }

    // =====================================================================
    // FileStorage
    // =====================================================================

    #[test]
    fn test_file_missing_file_reads_as_empty() {
        let storage = FileStorage::new(temp_path("missing"));
        assert_eq!(storage.get("token").unwrap(), None);
    }

    #[test]
    fn test_file_value_survives_reopen() {
        // Simulates a restart: a second FileStorage on the same path sees
        // what the first one wrote.
        let path = temp_path("reopen");
        FileStorage::new(&path).set("token", "abc").unwrap();

        let reopened = FileStorage::new(&path);

        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("abc"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_delete_keeps_other_keys() {
        let path = temp_path("delete");
        let storage = FileStorage::new(&path);
        storage.set("token", "abc").unwrap();
        storage.set("theme", "dark").unwrap();

        storage.delete("token").unwrap();

        assert_eq!(storage.get("token").unwrap(), None);
        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_delete_missing_key_does_not_create_file() {
        let path = temp_path("noop");
        let storage = FileStorage::new(&path);

        storage.delete("token").unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn test_file_corrupt_contents_return_error() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not json").unwrap();

        let result = FileStorage::new(&path).get("token");

        assert!(matches!(result, Err(StorageError::Corrupt(_))));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_set_repairs_corrupt_file() {
        let path = temp_path("repair-set");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not json").unwrap();
        let storage = FileStorage::new(&path);

        storage.set("token", "abc").unwrap();

        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc"));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_delete_repairs_corrupt_file() {
        let path = temp_path("repair-delete");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{\"token\": ").unwrap();
        let storage = FileStorage::new(&path);

        storage.delete("token").unwrap();

        assert_eq!(storage.get("token").unwrap(), None);
        assert!(path.exists());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
