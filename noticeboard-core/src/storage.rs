//! Key-value persistence for the user event collection.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{NoticeBoardError, NoticeBoardResult};

/// Storage key the user collection is saved under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "notice_board_user_events";

/// A string-valued key-value store. Writes replace the whole value.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> NoticeBoardResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> NoticeBoardResult<()>;
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temp file in the same directory which is then renamed over
/// the target, so readers see either the old value or the new one.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> NoticeBoardResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(NoticeBoardError::Config(format!(
                "Invalid storage key '{key}'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> NoticeBoardResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> NoticeBoardResult<()> {
        let path = self.path_for(key)?;
        let persist_err =
            |e: std::io::Error| NoticeBoardError::Persistence(format!("{}: {e}", path.display()));

        std::fs::create_dir_all(&self.dir).map_err(persist_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(persist_err)?;
        tmp.write_all(value.as_bytes()).map_err(persist_err)?;
        tmp.as_file().sync_all().map_err(persist_err)?;
        tmp.persist(&path).map_err(|e| persist_err(e.error))?;

        Ok(())
    }
}

/// In-memory store. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.values.insert(key.to_string(), value.to_string());
        store
    }

    /// Make every subsequent `set` fail, as a full disk or exhausted quota would.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> NoticeBoardResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> NoticeBoardResult<()> {
        if self.fail_writes {
            return Err(NoticeBoardError::Persistence("storage quota exceeded".into()));
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get(DEFAULT_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested"));
        store.set("events", "[1]").unwrap();
        store.set("events", "[1,2]").unwrap();

        assert_eq!(store.get("events").unwrap().as_deref(), Some("[1,2]"));
        assert!(dir.path().join("nested/events.json").exists());
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let store = FileStore::new("/tmp");
        assert!(store.path_for("../escape").is_err());
        assert!(store.path_for("a/b").is_err());
        assert!(store.path_for("").is_err());
    }

    #[test]
    fn test_memory_store_failing_writes_keep_old_value() {
        let mut store = MemoryStore::with_value("k", "old");
        store.set_fail_writes(true);
        assert!(matches!(store.set("k", "new"), Err(NoticeBoardError::Persistence(_))));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("old"));
    }
}
