//! File-backed key-value store.
//!
//! All keys live in one JSON object (`{"key": "raw value", ...}`). Writes go
//! through an exclusive lock file and a tmp file + atomic rename, so a crash
//! never leaves a half-written store behind.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ascend_core::error::{AscendError, Result};
use ascend_core::store::KeyValueStore;
use async_trait::async_trait;
use tokio::sync::Mutex;

type StoreMap = BTreeMap<String, String>;

/// Errors that can occur during store file operations.
#[derive(Debug)]
pub enum JsonStoreError {
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing or serialization error.
    JsonError(serde_json::Error),
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for JsonStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonStoreError::IoError(e) => write!(f, "I/O error: {}", e),
            JsonStoreError::JsonError(e) => write!(f, "JSON error: {}", e),
            JsonStoreError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for JsonStoreError {}

impl From<std::io::Error> for JsonStoreError {
    fn from(e: std::io::Error) -> Self {
        JsonStoreError::IoError(e)
    }
}

impl From<serde_json::Error> for JsonStoreError {
    fn from(e: serde_json::Error) -> Self {
        JsonStoreError::JsonError(e)
    }
}

impl From<JsonStoreError> for AscendError {
    fn from(e: JsonStoreError) -> Self {
        match e {
            JsonStoreError::IoError(io) => io.into(),
            JsonStoreError::JsonError(json) => json.into(),
            JsonStoreError::LockError(msg) => AscendError::data_access(msg),
        }
    }
}

/// Key-value store persisted to a single JSON file.
///
/// Cloning shares the same in-process write lock.
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Creates a store handle. The file is created on first write.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(PathBuf) -> std::result::Result<T, JsonStoreError> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || f(path))
            .await
            .map_err(|e| AscendError::internal(format!("store task failed: {e}")))?
            .map_err(AscendError::from)
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.run_blocking(move |path| Ok(load_map(&path)?.remove(&key)))
            .await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let key = key.to_string();
        self.run_blocking(move |path| {
            update_map(&path, |map| {
                map.insert(key, value);
            })
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let key = key.to_string();
        self.run_blocking(move |path| {
            update_map(&path, |map| {
                map.remove(&key);
            })
        })
        .await
    }
}

/// Loads the whole map. A missing or empty file is an empty map.
fn load_map(path: &Path) -> std::result::Result<StoreMap, JsonStoreError> {
    if !path.exists() {
        return Ok(StoreMap::new());
    }

    let content = fs::read_to_string(path)?;

    if content.trim().is_empty() {
        return Ok(StoreMap::new());
    }

    Ok(serde_json::from_str(&content)?)
}

/// Read-modify-write under an exclusive file lock.
///
/// A store file that no longer parses is replaced rather than blocking
/// every future write.
fn update_map<F>(path: &Path, f: F) -> std::result::Result<(), JsonStoreError>
where
    F: FnOnce(&mut StoreMap),
{
    let _lock = FileLock::acquire(path)?;

    let mut map = match load_map(path) {
        Ok(map) => map,
        Err(JsonStoreError::JsonError(e)) => {
            tracing::warn!(
                "[JsonFileStore] Discarding unreadable store at {}: {}",
                path.display(),
                e
            );
            StoreMap::new()
        }
        Err(e) => return Err(e),
    };

    f(&mut map);
    save_map(path, &map)
}

/// Writes the map atomically (tmp file + fsync + rename).
fn save_map(path: &Path, map: &StoreMap) -> std::result::Result<(), JsonStoreError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(map)?;

    let tmp_path = temp_path(path)?;
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(json.as_bytes())?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path)?;

    Ok(())
}

fn temp_path(path: &Path) -> std::result::Result<PathBuf, JsonStoreError> {
    let parent = path.parent().ok_or_else(|| {
        JsonStoreError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        ))
    })?;
    let file_name = path.file_name().ok_or_else(|| {
        JsonStoreError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no file name",
        ))
    })?;

    Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> std::result::Result<Self, JsonStoreError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive().map_err(|e| {
                JsonStoreError::LockError(format!("Failed to acquire lock: {}", e))
            })?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Best effort; the lock itself is released with the handle.
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("store.json"));

        store.set("theme", "\"dark\"".to_string()).await.unwrap();

        assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("\"dark\""));
        assert!(store.get("language").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_survives_new_handle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("store.json");

        JsonFileStore::new(path.clone())
            .set("language", "\"ar\"".to_string())
            .await
            .unwrap();

        let reopened = JsonFileStore::new(path);
        assert_eq!(
            reopened.get("language").await.unwrap().as_deref(),
            Some("\"ar\"")
        );
    }

    #[tokio::test]
    async fn test_last_write_wins_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("store.json"));

        store.set("k", "1".to_string()).await.unwrap();
        store.set("k", "2".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("2"));

        store.remove("k").await.unwrap();
        store.remove("missing").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_error_and_is_replaced_on_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(path);

        let err = store.get("theme").await.unwrap_err();
        assert!(err.is_serialization());

        store.set("theme", "\"light\"".to_string()).await.unwrap();
        assert_eq!(
            store.get("theme").await.unwrap().as_deref(),
            Some("\"light\"")
        );
    }

    #[tokio::test]
    async fn test_no_temp_or_lock_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("store.json"));
        store.set("k", "v".to_string()).await.unwrap();

        assert!(!temp_dir.path().join(".store.json.tmp").exists());
        assert!(!temp_dir.path().join("store.lock").exists());
        assert!(temp_dir.path().join("store.json").exists());
    }
}
