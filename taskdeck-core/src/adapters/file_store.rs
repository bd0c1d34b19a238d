//! File-backed key-value store
//!
//! Each key is one file in the store directory. Writes go to a temporary file
//! in the same directory and are renamed into place while holding an
//! exclusive lock on `.lock`, so concurrent processes never observe a partial
//! value.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStore;

const LOCK_FILE: &str = ".lock";

/// Durable key-value store on the local filesystem
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::storage(format!("Invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(key))
    }

    /// Hold the directory lock for the duration of `f`
    fn locked<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock_file: File = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;
        lock_file
            .lock_exclusive()
            .map_err(|e| Error::storage(format!("Failed to lock store: {}", e)))?;

        let result = f();

        let _ = lock_file.unlock();
        result
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        self.locked(|| {
            // NamedTempFile is created with owner-only permissions on Unix
            let mut tmp = NamedTempFile::new_in(&self.dir)?;
            tmp.write_all(value.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path)
                .map_err(|e| Error::storage(format!("Failed to write '{}': {}", key, e.error)))?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        self.locked(|| match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_remove() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path()).unwrap();

        assert_eq!(store.get("authToken").unwrap(), None);

        store.set("authToken", "abc").unwrap();
        assert_eq!(store.get("authToken").unwrap(), Some("abc".to_string()));

        store.set("authToken", "def").unwrap();
        assert_eq!(store.get("authToken").unwrap(), Some("def".to_string()));

        store.remove("authToken").unwrap();
        assert_eq!(store.get("authToken").unwrap(), None);
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path()).unwrap();
        store.remove("userData").unwrap();
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        FileKeyValueStore::new(dir.path())
            .unwrap()
            .set("userData", r#"{"id":1}"#)
            .unwrap();

        let reopened = FileKeyValueStore::new(dir.path()).unwrap();
        assert_eq!(
            reopened.get("userData").unwrap(),
            Some(r#"{"id":1}"#.to_string())
        );
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path()).unwrap();

        assert!(matches!(store.set("../escape", "x"), Err(Error::Storage(_))));
        assert!(matches!(store.get(""), Err(Error::Storage(_))));
        assert!(matches!(store.remove("a/b"), Err(Error::Storage(_))));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("session").join("store");
        let store = FileKeyValueStore::new(&nested).unwrap();
        store.set("authToken", "abc").unwrap();
        assert!(nested.join("authToken").exists());
    }
}
