use crate::error::StorageError;
use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
};

/// Durable string-keyed storage the task store persists through.
pub trait KeyValueStorage {
    /// Returns `Ok(None)` when nothing has been stored under `key` yet.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One JSON file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::io(path, err)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|err| StorageError::io(&self.dir, err))?;
        let path = self.path_for(key);
        // Readers only ever see a complete record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|err| StorageError::io(&tmp, err))?;
        fs::rename(&tmp, &path).map_err(|err| {
            // Best effort; the rename error is the one worth reporting.
            let _ = fs::remove_file(&tmp);
            StorageError::io(&path, err)
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_string(), value.into());
        storage
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_reports_missing_key_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.get("tasks").unwrap().is_none());
    }

    #[test]
    fn file_storage_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested").join("board"));
        storage.set("tasks", "[]").unwrap();
        storage.set("tasks", "[1]").unwrap();
        assert_eq!(storage.get("tasks").unwrap().as_deref(), Some("[1]"));
        assert!(!storage.path_for("tasks").with_extension("json.tmp").exists());
    }

    #[test]
    fn file_storage_surfaces_unreadable_record() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        // A directory where the record file should be cannot be read as a string.
        fs::create_dir_all(storage.path_for("tasks")).unwrap();
        assert!(matches!(
            storage.get("tasks"),
            Err(StorageError::Io { .. })
        ));
    }

    #[test]
    fn failed_replace_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        // A non-empty directory cannot be replaced by a file.
        let target = storage.path_for("tasks");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        assert!(matches!(
            storage.set("tasks", "[]"),
            Err(StorageError::Io { .. })
        ));
        assert!(!target.with_extension("json.tmp").exists());
    }

    #[test]
    fn memory_storage_counts_writes() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.writes(), 0);
        storage.set("tasks", "[]").unwrap();
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.raw("tasks"), Some("[]"));
    }
}
