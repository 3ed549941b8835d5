//! Local key/value persistence for session state
//!
//! The session store only needs string values under a couple of fixed keys,
//! so persistence is modelled as a tiny key/value trait. The file-backed
//! implementation keeps every key in one JSON object and rewrites it
//! atomically, so multi-key updates land together or not at all.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::{debug, warn};

use crate::errors::StorageError;

pub(crate) const SESSION_FILE: &str = "session.json";

pub type StorageResult<T> = Result<T, StorageError>;

/// Synchronous string key/value store.
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: String) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Write several keys. Implementations that can do so atomically
    /// should override this.
    fn set_all(&self, entries: Vec<(&str, String)>) -> StorageResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Remove several keys, attempting every key even if one fails.
    fn remove_all(&self, keys: &[&str]) -> StorageResult<()> {
        let mut first_err = None;
        for key in keys {
            if let Err(err) = self.remove(key) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// JSON-object file store.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Store backed by `path`. Parent directories are created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `<dir>/session.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SESSION_FILE))
    }

    /// Store in the platform data directory.
    pub fn platform_default() -> StorageResult<Self> {
        let dirs = ProjectDirs::from("", "userdesk", "userdeskctl")
            .ok_or(StorageError::NoDataDir)?;
        Ok(Self::in_dir(dirs.data_dir()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> StorageResult<BTreeMap<String, String>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|source| {
            StorageError::Corrupted {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Map used as the base for a mutation. A corrupted file is replaced
    /// rather than blocking every future write.
    fn read_map_for_update(&self) -> StorageResult<BTreeMap<String, String>> {
        match self.read_map() {
            Err(StorageError::Corrupted { path, source }) => {
                warn!(
                    "replacing corrupted store {}: {}",
                    path.display(),
                    source
                );
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> StorageResult<()> {
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        if map.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    Ok(())
                }
                Err(err) => Err(write_err(err)),
            };
        }

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(write_err)?;

        let json =
            serde_json::to_vec_pretty(map).map_err(StorageError::Encode)?;
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(
                tmp.path(),
                std::fs::Permissions::from_mode(0o600),
            )
            .map_err(write_err)?;
        }
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        debug!("wrote {} key(s) to {}", map.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.set_all(vec![(key, value)])
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.remove_all(&[key])
    }

    fn set_all(&self, entries: Vec<(&str, String)>) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_map_for_update()?;
        for (key, value) in entries {
            map.insert(key.to_string(), value);
        }
        self.write_map(&map)
    }

    fn remove_all(&self, keys: &[&str]) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_map_for_update()?;
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() == before && before > 0 {
            return Ok(());
        }
        self.write_map(&map)
    }
}

/// In-process store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn set_all(&self, entries: Vec<(&str, String)>) -> StorageResult<()> {
        let mut guard = self.entries.lock();
        for (key, value) in entries {
            guard.insert(key.to_string(), value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trips_and_removes_file_when_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::in_dir(dir.path().join("nested"));

        assert_eq!(store.get("token").unwrap(), None);
        store
            .set_all(vec![("token", "t-1".into()), ("user", "{}".into())])
            .unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("t-1"));
        assert_eq!(store.get("user").unwrap().as_deref(), Some("{}"));

        store.remove_all(&["token", "user"]).unwrap();
        assert_eq!(store.get("token").unwrap(), None);
        assert!(!store.path().exists());

        // Removing from an absent file is a no-op.
        store.remove("token").unwrap();
    }

    #[test]
    fn corrupted_file_reports_on_read_and_is_replaced_on_write() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::in_dir(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(
            store.get("token"),
            Err(StorageError::Corrupted { .. })
        ));

        store.set("token", "fresh".into()).unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("fresh"));
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::in_dir(dir.path());
        store.set("token", "secret".into()).unwrap();
        let mode =
            std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn memory_store_basics() {
        let store = MemoryKeyValueStore::new();
        store.set("a", "1".into()).unwrap();
        store.set_all(vec![("b", "2".into())]).unwrap();
        assert_eq!(store.len(), 2);
        store.remove_all(&["a", "b"]).unwrap();
        assert!(store.is_empty());
    }
}
