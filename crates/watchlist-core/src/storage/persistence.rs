//! Snapshot persistence
//!
//! Handles saving and loading store snapshots. The file adapter uses atomic
//! writes (write to temp file, then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/watchlist/` (configurable via `Config`)
//!
//! Files:
//! - `watchlist.json` - The current snapshot
//! - `watchlist.json.corrupt.backup` - Copy of a snapshot that failed validation

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use crate::config::Config;
use crate::error::ValidationError;
use crate::snapshot::Snapshot;

/// Durable home for store snapshots
pub trait SnapshotStorage {
    /// Load the last saved snapshot, or a fallback
    ///
    /// Never fails: missing or malformed data yields the fallback snapshot
    /// plus a warning for the presentation layer.
    fn load(&self) -> LoadOutcome;

    /// Overwrite the stored snapshot
    fn save(&self, snapshot: &Snapshot) -> StorageResult<()>;

    /// Block until every save issued so far is durable
    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Why a load fell back to the default snapshot
#[derive(Error, Debug)]
pub enum LoadWarning {
    /// Stored data exists but does not validate
    #[error("Saved watchlist is malformed ({error}); starting from the default list")]
    Malformed {
        error: ValidationError,
        /// Where the rejected data was copied, if the copy succeeded
        backup_path: Option<PathBuf>,
    },

    /// Stored data could not be read
    #[error("Saved watchlist could not be read ({0}); starting from the default list")]
    Unreadable(#[source] StorageError),
}

/// Result of [`SnapshotStorage::load`]
#[derive(Debug)]
pub struct LoadOutcome {
    pub snapshot: Snapshot,
    pub warning: Option<LoadWarning>,
}

impl LoadOutcome {
    pub fn loaded(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            warning: None,
        }
    }

    pub fn fallback(snapshot: Snapshot, warning: LoadWarning) -> Self {
        Self {
            snapshot,
            warning: Some(warning),
        }
    }
}

/// JSON file persistence
pub struct FileStorage {
    path: PathBuf,
    fallback: Snapshot,
}

impl FileStorage {
    /// Store at the configured snapshot path, falling back to the sample list
    pub fn new(config: &Config) -> Self {
        Self::at(config.snapshot_path())
    }

    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fallback: Snapshot::sample(),
        }
    }

    /// Replace the snapshot used when nothing valid is stored
    pub fn with_fallback(mut self, fallback: Snapshot) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a snapshot exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Where a rejected snapshot is copied before falling back
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt.backup");
        PathBuf::from(name)
    }

    /// Size of the stored snapshot in bytes (0 if absent)
    pub fn size(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }
}

impl SnapshotStorage for FileStorage {
    fn load(&self) -> LoadOutcome {
        if !self.path.exists() {
            debug!("No saved snapshot at {:?}, using default", self.path);
            return LoadOutcome::loaded(self.fallback.clone());
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                let err = StorageError::from_read_io(e, self.path.clone());
                warn!("Failed to read snapshot: {}", err);
                return LoadOutcome::fallback(self.fallback.clone(), LoadWarning::Unreadable(err));
            }
        };

        match Snapshot::from_json(&content) {
            Ok(snapshot) => {
                debug!("Loaded {} items from {:?}", snapshot.len(), self.path);
                LoadOutcome::loaded(snapshot)
            }
            Err(error) => {
                let backup = self.backup_path();
                let backup_path = match fs::copy(&self.path, &backup) {
                    Ok(_) => Some(backup),
                    Err(e) => {
                        warn!("Could not back up malformed snapshot to {:?}: {}", backup, e);
                        None
                    }
                };
                warn!(
                    "Saved snapshot at {:?} is malformed: {}; using default",
                    self.path, error
                );
                LoadOutcome::fallback(
                    self.fallback.clone(),
                    LoadWarning::Malformed { error, backup_path },
                )
            }
        }
    }

    fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        atomic_write(&self.path, snapshot.to_json().as_bytes())
    }
}

/// In-memory persistence for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryStorage {
    raw: Mutex<Option<String>>,
    fallback: Snapshot,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStorage {
    /// Empty storage whose fallback is the empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `snapshot`
    pub fn with_snapshot(snapshot: &Snapshot) -> Self {
        Self::with_raw(snapshot.to_json())
    }

    /// Storage that already holds raw (possibly malformed) text
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail as if the quota were exhausted
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The last successfully written snapshot
    pub fn saved(&self) -> Option<Snapshot> {
        let raw = self.raw.lock().unwrap_or_else(|e| e.into_inner());
        raw.as_deref().and_then(|r| Snapshot::from_json(r).ok())
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self) -> LoadOutcome {
        let raw = self.raw.lock().unwrap_or_else(|e| e.into_inner());
        match raw.as_deref() {
            None => LoadOutcome::loaded(self.fallback.clone()),
            Some(text) => match Snapshot::from_json(text) {
                Ok(snapshot) => LoadOutcome::loaded(snapshot),
                Err(error) => LoadOutcome::fallback(
                    self.fallback.clone(),
                    LoadWarning::Malformed {
                        error,
                        backup_path: None,
                    },
                ),
            },
        }
    }

    fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::QuotaExceeded(
                "in-memory storage is refusing writes".to_string(),
            ));
        }
        *self.raw.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.to_json());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
        }
    }

    // Same directory so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
