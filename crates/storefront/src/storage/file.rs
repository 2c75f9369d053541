//! JSON-file backed store used by the CLI.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::warn;

use super::{KeyValueStore, StorageError};

/// File name inside the data directory.
const STORAGE_FILE: &str = "storage.json";

/// [`KeyValueStore`] persisted as a single JSON object on disk.
///
/// Every operation re-reads the file so that separate processes see each
/// other's writes, and every write replaces the file wholesale via a
/// uniquely named temporary file and rename. Concurrent writers of the same
/// key race and the last one wins; keys neither of them touched survive.
/// A corrupt file is treated as empty.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open (or lazily create) the store under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `data_dir` cannot be created.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = data_dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            path: dir.join(STORAGE_FILE),
            lock: Mutex::new(()),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&contents) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Storage file is corrupt, starting empty");
                Ok(BTreeMap::new())
            }
        }
    }

    /// Write `map` to a uniquely named sibling file, then rename it over the
    /// store. Readers in other handles or processes see either the old file
    /// or the new one, never a partial write.
    fn save(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(map)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut map = self.load()?;
        f(&mut map);
        self.save(&map)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|map| {
            map.remove(key);
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        store.set("cart_ana", "[]").unwrap();
        store.set("is_admin", "false").unwrap();
        drop(store);

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("cart_ana").unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get("is_admin").unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
        store.remove("anything").unwrap();
    }

    #[test]
    fn test_corrupt_file_reads_empty_and_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.get("user").unwrap(), None);

        store.set("user", "{}").unwrap();
        assert_eq!(store.get("user").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_two_handles_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let a = FileStore::open(dir.path()).unwrap();
        let b = FileStore::open(dir.path()).unwrap();

        a.set("cart_guest", "[1]").unwrap();
        b.set("cart_guest", "[2]").unwrap();

        assert_eq!(a.get("cart_guest").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_concurrent_handles_keep_untouched_keys() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::open(dir.path())
            .unwrap()
            .set("cart_ana", "[7]")
            .unwrap();

        let writers: Vec<_> = ["cart_ben", "cart_guest"]
            .into_iter()
            .map(|key| {
                let store = FileStore::open(dir.path()).unwrap();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        store.set(key, &format!("[{i}]")).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("cart_ana").unwrap().as_deref(), Some("[7]"));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name != STORAGE_FILE)
            .collect();
        assert!(leftovers.is_empty(), "temporary files left behind: {leftovers:?}");
    }
}
