//! Contact store
//!
//! The `ContactStore` owns the authoritative, ordered contact collection and
//! keeps the persistence slot in step with it.
//!
//! ## Lifecycle
//!
//! The slot is read once when the store is opened. Every mutating operation
//! (`add`, `delete`, `replace_all`) ends with an explicit sync: the new
//! collection is written only if it differs from the current one.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = ContactStore::open_with_config(&config)?;
//!
//! store.add("Ann", "459-12-56")?;
//!
//! let visible = store.filter(&filter_key("AN"));
//! ```

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::Contact;
use crate::storage::{FilePersistence, Persistence, StorageError};

/// Errors returned by store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A contact with exactly this name already exists
    #[error("{0} is already in contacts.")]
    DuplicateName(String),

    /// The persistence slot could not be read or written
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Normalize raw filter input into the form `ContactStore::filter` expects
pub fn filter_key(raw: &str) -> String {
    raw.to_lowercase()
}

/// Select the contacts whose name contains `needle`
///
/// `needle` must already be lower-cased. Order is preserved.
pub fn filter_contacts(contacts: &[Contact], needle: &str) -> Vec<Contact> {
    contacts
        .iter()
        .filter(|contact| contact.name_matches(needle))
        .cloned()
        .collect()
}

/// Ordered contact collection backed by a persistence slot
pub struct ContactStore<P: Persistence = FilePersistence> {
    contacts: Vec<Contact>,
    persistence: P,
}

impl ContactStore<FilePersistence> {
    /// Open the store backed by the snapshot file named in `config`
    pub fn open_with_config(config: &Config) -> StoreResult<Self> {
        Self::open(FilePersistence::new(config))
    }
}

impl<P: Persistence> ContactStore<P> {
    /// Open the store, loading whatever the slot holds
    ///
    /// - Missing slot: start empty
    /// - Malformed slot: log a warning and start empty
    /// - Any other storage failure is returned to the caller
    pub fn open(persistence: P) -> StoreResult<Self> {
        let contacts = match persistence.load() {
            Ok(Some(contacts)) => {
                debug!("Opened store with {} contacts", contacts.len());
                contacts
            }
            Ok(None) => {
                debug!("No stored contacts, starting empty");
                Vec::new()
            }
            Err(err @ StorageError::CorruptDocument { .. }) => {
                warn!("{}; starting with an empty phonebook", err);
                if let Some(hint) = err.recovery_suggestion() {
                    warn!("{}", hint);
                }
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            contacts,
            persistence,
        })
    }

    // ==================== Mutations ====================

    /// Add a new contact at the end of the collection
    ///
    /// Fails with `DuplicateName` if a contact with exactly this name exists;
    /// the collection is left untouched in that case.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        number: impl Into<String>,
    ) -> StoreResult<Contact> {
        let name = name.into();
        if self.find_by_name(&name).is_some() {
            debug!("Rejected duplicate name {:?}", name);
            return Err(StoreError::DuplicateName(name));
        }

        let contact = Contact::new(name, number);
        let mut next = self.contacts.clone();
        next.push(contact.clone());
        self.commit(next)?;

        info!("Added contact {} ({})", contact.name, contact.id);
        Ok(contact)
    }

    /// Remove the contact with the given ID
    ///
    /// Returns the removed contact, or `None` if nothing matched. An unknown
    /// ID is not an error and leaves the slot untouched.
    pub fn delete(&mut self, id: &str) -> StoreResult<Option<Contact>> {
        let removed = self.get(id).cloned();
        let next: Vec<Contact> = self
            .contacts
            .iter()
            .filter(|contact| contact.id != id)
            .cloned()
            .collect();
        self.commit(next)?;

        if let Some(contact) = &removed {
            info!("Deleted contact {} ({})", contact.name, contact.id);
        }
        Ok(removed)
    }

    /// Replace the whole collection
    ///
    /// Names are not checked for duplicates on this path.
    pub fn replace_all(&mut self, contacts: Vec<Contact>) -> StoreResult<()> {
        if has_duplicate_names(&contacts) {
            warn!("Replacing contacts with a collection that repeats names");
        }
        self.commit(contacts)
    }

    /// Write `next` to the slot if it differs from the current collection,
    /// then adopt it
    fn commit(&mut self, next: Vec<Contact>) -> StoreResult<()> {
        if next == self.contacts {
            debug!("Contacts unchanged, skipping save");
            return Ok(());
        }

        self.persistence.save(&next)?;
        self.contacts = next;
        Ok(())
    }

    // ==================== Queries ====================

    /// Contacts whose name contains `needle` (already lower-cased)
    pub fn filter(&self, needle: &str) -> Vec<Contact> {
        filter_contacts(&self.contacts, needle)
    }

    /// All contacts in insertion order
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Get a contact by ID
    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.id == id)
    }

    /// Get a contact by exact name
    pub fn find_by_name(&self, name: &str) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.name == name)
    }

    /// Number of contacts
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Whether the phonebook is empty
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// The persistence port
    pub fn persistence(&self) -> &P {
        &self.persistence
    }
}

fn has_duplicate_names(contacts: &[Contact]) -> bool {
    let mut seen = std::collections::HashSet::new();
    contacts.iter().any(|contact| !seen.insert(contact.name.as_str()))
}
