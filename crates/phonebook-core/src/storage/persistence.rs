//! Contact snapshot persistence
//!
//! The store talks to storage through the [`Persistence`] port. The file
//! implementation keeps a single JSON snapshot of the whole collection under
//! a fixed key, using atomic writes (write to temp file, then rename) to
//! prevent corruption.
//!
//! Storage location: `~/.local/share/phonebook/` (configurable via `Config`)
//!
//! Files:
//! - `<storage_key>.json` - The contact snapshot (default key `myPhonebook`)
//! - `<storage_key>.json.corrupt.backup` - Copy of an unreadable snapshot

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Config;
use crate::models::Contact;
use crate::storage::error::{StorageError, StorageResult};

/// Port between the contact store and a durable snapshot slot
pub trait Persistence {
    /// Read the stored snapshot
    ///
    /// Returns `Ok(None)` when nothing has been stored yet, and
    /// `StorageError::CorruptDocument` when the slot exists but cannot be parsed.
    fn load(&self) -> StorageResult<Option<Vec<Contact>>>;

    /// Overwrite the slot with a snapshot of `contacts`
    fn save(&mut self, contacts: &[Contact]) -> StorageResult<()>;
}

/// Sizes of the files backing a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub snapshot_exists: bool,
    pub snapshot_size: u64,
    pub backup_exists: bool,
    pub backup_size: u64,
}

impl StorageStats {
    /// Total bytes on disk
    pub fn total_size(&self) -> u64 {
        self.snapshot_size + self.backup_size
    }

    /// Total size formatted for humans
    pub fn total_size_human(&self) -> String {
        let size = self.total_size();
        if size < 1024 {
            format!("{} B", size)
        } else if size < 1024 * 1024 {
            format!("{:.1} KB", size as f64 / 1024.0)
        } else {
            format!("{:.1} MB", size as f64 / (1024.0 * 1024.0))
        }
    }
}

/// JSON-file backed snapshot slot
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    /// Create a persistence handler for the slot named by the configuration
    pub fn new(config: &Config) -> Self {
        Self::at_path(config.snapshot_path())
    }

    /// Create a persistence handler for an explicit file path
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path a corrupted snapshot is copied to
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt.backup");
        PathBuf::from(name)
    }

    /// Sizes of the snapshot and backup files
    pub fn stats(&self) -> StorageStats {
        let size_of = |path: &Path| fs::metadata(path).map(|m| m.len()).ok();
        let snapshot = size_of(&self.path);
        let backup = size_of(&self.backup_path());
        StorageStats {
            snapshot_exists: snapshot.is_some(),
            snapshot_size: snapshot.unwrap_or(0),
            backup_exists: backup.is_some(),
            backup_size: backup.unwrap_or(0),
        }
    }

    /// Copy an unreadable snapshot aside so the next save cannot destroy it
    fn backup_corrupt(&self) -> Option<PathBuf> {
        let backup = self.backup_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => Some(backup),
            Err(e) => {
                warn!("Could not back up corrupted snapshot to {:?}: {}", backup, e);
                None
            }
        }
    }
}

impl Persistence for FilePersistence {
    fn load(&self) -> StorageResult<Option<Vec<Contact>>> {
        if !self.path.exists() {
            debug!("No snapshot at {:?}", self.path);
            return Ok(None);
        }

        let content =
            fs::read(&self.path).map_err(|e| StorageError::from_read(e, self.path.clone()))?;

        // An empty slot is treated the same as a missing one
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        // Bytes that are not UTF-8 fail here too, as a corrupt snapshot
        match serde_json::from_slice::<Vec<Contact>>(&content) {
            Ok(contacts) => {
                debug!("Loaded {} contacts from {:?}", contacts.len(), self.path);
                Ok(Some(contacts))
            }
            Err(e) => Err(StorageError::CorruptDocument {
                path: self.path.clone(),
                backup_path: self.backup_corrupt(),
                details: e.to_string(),
            }),
        }
    }

    fn save(&mut self, contacts: &[Contact]) -> StorageResult<()> {
        let json = serde_json::to_string(contacts)?;
        atomic_write(&self.path, json.as_bytes())?;
        debug!("Saved {} contacts to {:?}", contacts.len(), self.path);
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
    }

    // Same directory, so the rename stays on one filesystem
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_persistence(temp_dir: &TempDir) -> FilePersistence {
        FilePersistence::at_path(temp_dir.path().join("myPhonebook.json"))
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut persistence = test_persistence(&temp_dir);

        // Initially no snapshot
        assert!(!persistence.path().exists());
        assert!(persistence.load().unwrap().is_none());

        let contacts = vec![
            Contact::new("Rosie Simpson", "459-12-56"),
            Contact::new("Hermione Kline", "443-89-12"),
        ];
        persistence.save(&contacts).unwrap();
        assert!(persistence.path().exists());

        let loaded = persistence.load().unwrap().unwrap();
        assert_eq!(loaded, contacts);
    }

    #[test]
    fn test_snapshot_is_plain_json_array() {
        let temp_dir = TempDir::new().unwrap();
        let mut persistence = test_persistence(&temp_dir);

        persistence
            .save(&[Contact::with_id("id-1", "Ann", "123")])
            .unwrap();

        let raw = fs::read_to_string(persistence.path()).unwrap();
        assert_eq!(raw, r#"[{"id":"id-1","name":"Ann","number":"123"}]"#);
    }

    #[test]
    fn test_load_foreign_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        fs::write(
            persistence.path(),
            r#"[{"id":"id-1","name":"Eden Clements","number":"645-17-79"}]"#,
        )
        .unwrap();

        let loaded = persistence.load().unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Eden Clements");
    }

    #[test]
    fn test_empty_file_is_treated_as_missing() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        fs::write(persistence.path(), "").unwrap();
        assert!(persistence.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_snapshot_is_backed_up() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        fs::write(persistence.path(), "{not json").unwrap();

        let err = persistence.load().unwrap_err();
        match err {
            StorageError::CorruptDocument {
                path, backup_path, ..
            } => {
                assert_eq!(path, persistence.path());
                let backup = backup_path.unwrap();
                assert_eq!(backup, persistence.backup_path());
                assert_eq!(fs::read_to_string(backup).unwrap(), "{not json");
            }
            other => panic!("expected CorruptDocument, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_snapshot_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        fs::write(persistence.path(), [0xff, 0xfe]).unwrap();

        match persistence.load().unwrap_err() {
            StorageError::CorruptDocument { backup_path, .. } => {
                assert_eq!(fs::read(backup_path.unwrap()).unwrap(), vec![0xff, 0xfe]);
            }
            other => panic!("expected CorruptDocument, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_only_file_is_treated_as_missing() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        fs::write(persistence.path(), " \n\t").unwrap();
        assert!(persistence.load().unwrap().is_none());
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        fs::write(persistence.path(), r#"{"contacts":[]}"#).unwrap();
        assert!(matches!(
            persistence.load(),
            Err(StorageError::CorruptDocument { .. })
        ));
    }

    #[test]
    fn test_backup_path() {
        let persistence = FilePersistence::at_path("/data/myPhonebook.json");
        assert_eq!(
            persistence.backup_path(),
            PathBuf::from("/data/myPhonebook.json.corrupt.backup")
        );
    }

    #[test]
    fn test_stats() {
        let temp_dir = TempDir::new().unwrap();
        let mut persistence = test_persistence(&temp_dir);

        let stats = persistence.stats();
        assert!(!stats.snapshot_exists);
        assert_eq!(stats.total_size(), 0);
        assert_eq!(stats.total_size_human(), "0 B");

        persistence.save(&[Contact::new("Ann", "123")]).unwrap();
        let stats = persistence.stats();
        assert!(stats.snapshot_exists);
        assert!(stats.snapshot_size > 0);
        assert!(!stats.backup_exists);
    }

    #[test]
    fn test_total_size_human() {
        let stats = StorageStats {
            snapshot_exists: true,
            snapshot_size: 2048,
            backup_exists: false,
            backup_size: 0,
        };
        assert_eq!(stats.total_size_human(), "2.0 KB");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("c")
            .join("file.txt");

        atomic_write(&nested_path, b"test data").unwrap();

        assert!(nested_path.exists());
        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "test data");
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let mut persistence = test_persistence(&temp_dir);

        persistence
            .save(&[Contact::new("Ann", "123"), Contact::new("Bob", "456")])
            .unwrap();
        persistence.save(&[]).unwrap();

        assert_eq!(persistence.load().unwrap().unwrap(), Vec::<Contact>::new());
        // No stray temp file left behind
        assert!(!persistence.path().with_extension("tmp").exists());
    }
}
