//! In-memory snapshot slot
//!
//! Holds the serialized snapshot as a string, so loads go through the same
//! JSON decoding as the file slot. Counts writes so callers can check that
//! unchanged collections are not re-saved.

use std::path::PathBuf;

use crate::models::Contact;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::persistence::Persistence;

/// Location reported in errors from the in-memory slot
const MEMORY_LOCATION: &str = ":memory:";

#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    slot: Option<String>,
    writes: usize,
}

impl MemoryPersistence {
    /// Empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with a snapshot of `contacts`
    pub fn with_contacts(contacts: &[Contact]) -> StorageResult<Self> {
        Ok(Self {
            slot: Some(serde_json::to_string(contacts)?),
            writes: 0,
        })
    }

    /// Slot pre-filled with arbitrary text (e.g. a malformed snapshot)
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
            writes: 0,
        }
    }

    /// Number of successful saves
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self) -> StorageResult<Option<Vec<Contact>>> {
        let Some(raw) = self.slot.as_deref() else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| StorageError::CorruptDocument {
                path: PathBuf::from(MEMORY_LOCATION),
                backup_path: None,
                details: e.to_string(),
            })
    }

    fn save(&mut self, contacts: &[Contact]) -> StorageResult<()> {
        self.slot = Some(serde_json::to_string(contacts)?);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot() {
        let persistence = MemoryPersistence::new();
        assert!(persistence.load().unwrap().is_none());
        assert_eq!(persistence.writes(), 0);
    }

    #[test]
    fn test_save_and_load() {
        let mut persistence = MemoryPersistence::new();
        let contacts = vec![Contact::with_id("id-1", "Ann", "123")];

        persistence.save(&contacts).unwrap();

        assert_eq!(persistence.writes(), 1);
        assert_eq!(persistence.load().unwrap().unwrap(), contacts);
    }

    #[test]
    fn test_with_contacts_does_not_count_as_write() {
        let persistence =
            MemoryPersistence::with_contacts(&[Contact::new("Ann", "123")]).unwrap();
        assert_eq!(persistence.writes(), 0);
        assert_eq!(persistence.load().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_blank_slot_is_treated_as_missing() {
        let persistence = MemoryPersistence::with_raw("  ");
        assert!(persistence.load().unwrap().is_none());
    }

    #[test]
    fn test_malformed_slot_is_corrupt() {
        let persistence = MemoryPersistence::with_raw("[{]");
        match persistence.load() {
            Err(StorageError::CorruptDocument {
                path, backup_path, ..
            }) => {
                assert_eq!(path, PathBuf::from(":memory:"));
                assert!(backup_path.is_none());
            }
            other => panic!("expected CorruptDocument, got {:?}", other),
        }
    }
}
