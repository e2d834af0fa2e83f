//! Local file-based state storage backend.
//!
//! State lives in `state.json` inside a directory (by default `.swapi/`
//! next to the manifest), with `state.lock` beside it.

use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{Result, StateError, SwapiError};

use super::lock::{generate_holder_id, LockInfo, LOCK_EXPIRY_SECS};
use super::store::StateStore;
use super::types::{ProviderState, STATE_VERSION};

/// Default state directory name.
pub const STATE_DIR: &str = ".swapi";

/// State file name.
const STATE_FILE: &str = "state.json";

/// Lock file name.
const LOCK_FILE: &str = "state.lock";

/// Local file-based state store.
#[derive(Debug)]
pub struct LocalStateStore {
    /// Base directory for state files.
    base_dir: PathBuf,
    /// Path to the state file.
    state_path: PathBuf,
    /// Path to the lock file.
    lock_path: PathBuf,
}

impl LocalStateStore {
    /// Creates a store in `<dir>/.swapi`.
    #[must_use]
    pub fn beside(dir: &Path) -> Self {
        Self::with_base_dir(dir.join(STATE_DIR))
    }

    /// Creates a store with a custom base directory.
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let state_path = base_dir.join(STATE_FILE);
        let lock_path = base_dir.join(LOCK_FILE);

        Self {
            base_dir,
            state_path,
            lock_path,
        }
    }

    /// Path of the state file.
    #[must_use]
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Ensures the state directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if !self.base_dir.exists() {
            debug!("Creating state directory: {}", self.base_dir.display());
            fs::create_dir_all(&self.base_dir)
                .await
                .map_err(|e| StateError::write(format!("Failed to create state directory: {e}")))?;
        }
        Ok(())
    }

    /// Writes `content` to `path` through a temporary file and a rename.
    async fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let temp_path = temp_path_for(path);

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| StateError::write(format!("Failed to create {}: {e}", temp_path.display())))?;
        file.write_all(content)
            .await
            .map_err(|e| StateError::write(format!("Failed to write {}: {e}", temp_path.display())))?;
        file.sync_all()
            .await
            .map_err(|e| StateError::write(format!("Failed to sync {}: {e}", temp_path.display())))?;

        fs::rename(&temp_path, path)
            .await
            .map_err(|e| StateError::write(format!("Failed to rename to {}: {e}", path.display())))?;

        Ok(())
    }

    /// Creates the lock file, failing with `AlreadyExists` if another
    /// holder got there first.
    async fn create_lock_file(&self, content: &[u8]) -> std::io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path)
            .await?;
        file.write_all(content).await?;
        file.sync_all().await
    }

    /// Reads the lock file if it exists.
    async fn read_lock_file(&self) -> Result<Option<LockInfo>> {
        if !self.lock_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.lock_path).await.map_err(|e| {
            SwapiError::State(StateError::Corrupted {
                message: format!("Failed to read lock file: {e}"),
            })
        })?;

        let lock_info: LockInfo = serde_json::from_str(&content).map_err(|e| {
            SwapiError::State(StateError::Corrupted {
                message: format!("Failed to parse lock file: {e}"),
            })
        })?;

        Ok(Some(lock_info))
    }

    /// Deletes the lock file.
    async fn delete_lock_file(&self) -> Result<()> {
        if self.lock_path.exists() {
            fs::remove_file(&self.lock_path).await.map_err(|e| {
                SwapiError::State(StateError::LockFailed {
                    message: format!("Failed to delete lock file: {e}"),
                })
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for LocalStateStore {
    async fn load(&self) -> Result<Option<ProviderState>> {
        if !self.state_path.exists() {
            debug!("State file does not exist: {}", self.state_path.display());
            return Ok(None);
        }

        info!("Loading state from: {}", self.state_path.display());

        let content = fs::read_to_string(&self.state_path).await.map_err(|e| {
            SwapiError::State(StateError::Corrupted {
                message: format!("Failed to read state file: {e}"),
            })
        })?;

        let state: ProviderState = serde_json::from_str(&content).map_err(|e| {
            SwapiError::State(StateError::Corrupted {
                message: format!("Failed to parse state file: {e}"),
            })
        })?;

        if state.version != STATE_VERSION {
            return Err(SwapiError::State(StateError::VersionMismatch {
                expected: STATE_VERSION.to_string(),
                found: state.version,
            }));
        }

        Ok(Some(state))
    }

    async fn save(&self, state: &ProviderState) -> Result<()> {
        info!("Saving state to: {}", self.state_path.display());

        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StateError::serialization(format!("Failed to serialize state: {e}")))?;

        self.write_atomic(&self.state_path, content.as_bytes()).await?;

        debug!("State saved successfully");
        Ok(())
    }

    async fn acquire_lock(&self, holder: &str, operation: &str) -> Result<LockInfo> {
        let holder_id = if holder.is_empty() {
            generate_holder_id()
        } else {
            holder.to_string()
        };

        let lock_info = LockInfo::new(&holder_id).for_operation(operation);
        let content = serde_json::to_string_pretty(&lock_info)
            .map_err(|e| StateError::serialization(format!("Failed to serialize lock: {e}")))?;

        self.ensure_dir().await?;

        let mut took_over = false;
        loop {
            match self.create_lock_file(content.as_bytes()).await {
                Ok(()) => break,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => {
                    return Err(SwapiError::State(StateError::LockFailed {
                        message: format!("Failed to create lock file: {e}"),
                    }));
                }
            }

            // Someone else holds the lock file. Only an expired lock may be
            // replaced, and only once per call.
            match self.read_lock_file().await? {
                Some(existing) if took_over || !existing.is_expired() => {
                    return Err(SwapiError::State(StateError::LockedByOther {
                        holder: existing.holder,
                        since: existing.acquired_at.to_rfc3339(),
                    }));
                }
                Some(_) => {
                    debug!("Expired lock found, taking over");
                    self.delete_lock_file().await?;
                    took_over = true;
                }
                None if took_over => {
                    return Err(SwapiError::State(StateError::LockFailed {
                        message: String::from("Lock file changed hands while acquiring"),
                    }));
                }
                None => took_over = true,
            }
        }

        info!(
            "Acquired state lock: {} (expires in {}s)",
            lock_info.lock_id, LOCK_EXPIRY_SECS
        );

        Ok(lock_info)
    }

    async fn release_lock(&self, lock_id: &str) -> Result<()> {
        if let Some(existing) = self.read_lock_file().await? {
            if existing.lock_id == lock_id {
                self.delete_lock_file().await?;
                info!("Released state lock: {lock_id}");
            } else {
                debug!(
                    "Lock ID mismatch: expected {lock_id}, found {}",
                    existing.lock_id
                );
            }
        }
        Ok(())
    }

    async fn get_lock_info(&self) -> Result<Option<LockInfo>> {
        self.read_lock_file().await
    }
}

/// Sibling temp file for `path`, e.g. `state.json.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PlanetResourceModel;
    use tempfile::TempDir;

    fn create_test_store() -> (LocalStateStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalStateStore::beside(temp_dir.path());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (store, _temp) = create_test_store();

        let mut state = ProviderState::new();
        state.set("hoth", PlanetResourceModel::imported("1"));
        store.save(&state).await.expect("Failed to save state");

        let loaded = store
            .load()
            .await
            .expect("Failed to load state")
            .expect("State should exist");

        assert_eq!(loaded.labels(), vec!["hoth"]);
        assert_eq!(
            loaded.get("hoth").and_then(|r| r.attributes.known_id()),
            Some("1")
        );
    }

    #[tokio::test]
    async fn test_load_nonexistent_defaults() {
        let (store, _temp) = create_test_store();

        assert!(store.load().await.expect("Load should not fail").is_none());
        assert!(store.load_or_default().await.expect("default").is_empty());
    }

    #[tokio::test]
    async fn test_version_mismatch() {
        let (store, _temp) = create_test_store();

        let mut state = ProviderState::new();
        state.version = String::from("0.1");
        store.save(&state).await.expect("Failed to save state");

        let err = store.load().await.unwrap_err();
        assert!(matches!(
            err,
            SwapiError::State(StateError::VersionMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_lock_acquire_release() {
        let (store, _temp) = create_test_store();

        let lock = store
            .acquire_lock("test-holder", "refresh")
            .await
            .expect("Failed to acquire lock");

        assert!(store.is_locked().await.expect("is_locked failed"));

        store
            .release_lock(&lock.lock_id)
            .await
            .expect("Failed to release lock");

        assert!(!store.is_locked().await.expect("is_locked failed"));
    }

    #[tokio::test]
    async fn test_lock_conflict() {
        let (store, _temp) = create_test_store();

        let _lock1 = store
            .acquire_lock("holder-1", "apply")
            .await
            .expect("Failed to acquire first lock");

        let err = store.acquire_lock("holder-2", "destroy").await.unwrap_err();
        assert!(matches!(
            err,
            SwapiError::State(StateError::LockedByOther { ref holder, .. }) if holder == "holder-1"
        ));
    }

    #[test]
    fn test_temp_paths_do_not_collide() {
        let store = LocalStateStore::with_base_dir("/tmp/swapi");

        assert_eq!(temp_path_for(store.state_path()), PathBuf::from("/tmp/swapi/state.json.tmp"));
        assert_eq!(temp_path_for(&store.lock_path), PathBuf::from("/tmp/swapi/state.lock.tmp"));
    }

    #[tokio::test]
    async fn test_expired_lock_is_taken_over() {
        let (store, _temp) = create_test_store();

        let mut stale = LockInfo::new("crashed").for_operation("apply");
        stale.expires_at = stale.acquired_at - chrono::Duration::seconds(1);
        store.ensure_dir().await.expect("dir");
        std::fs::write(&store.lock_path, serde_json::to_string(&stale).expect("json"))
            .expect("write stale lock");

        let lock = store.acquire_lock("fresh", "apply").await.expect("takeover");

        let current = store.get_lock_info().await.expect("read").expect("lock");
        assert_eq!(current.lock_id, lock.lock_id);
        assert_eq!(current.holder, "fresh");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_acquire_has_one_winner() {
        for _ in 0..50 {
            let temp = TempDir::new().expect("Failed to create temp dir");
            let first = LocalStateStore::beside(temp.path());
            let second = LocalStateStore::beside(temp.path());

            let (a, b) = tokio::join!(
                first.acquire_lock("A", "apply"),
                second.acquire_lock("B", "apply"),
            );

            assert_eq!(
                usize::from(a.is_ok()) + usize::from(b.is_ok()),
                1,
                "exactly one holder must win: {a:?} / {b:?}"
            );
        }
    }
}
