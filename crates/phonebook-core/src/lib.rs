//! Phonebook Core Library
//!
//! This crate provides the core functionality for Phonebook, a small
//! local contact list with duplicate-name detection and a filterable view.
//!
//! # Architecture
//!
//! - **ContactStore**: owns the ordered contact collection
//! - **Persistence**: injected port holding a JSON snapshot of the collection
//!
//! Every change to the collection is written back to the snapshot, unless
//! the new collection equals the old one.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = ContactStore::open_with_config(&Config::load()?)?;
//!
//! // Add a contact
//! store.add("Rosie Simpson", "459-12-56")?;
//!
//! // Query contacts
//! let visible = store.filter(&filter_key("rosie"));
//! ```
//!
//! # Modules
//!
//! - `store`: Contact store (main entry point)
//! - `models`: The contact record
//! - `validation`: Name and number checks for input surfaces
//! - `storage`: Snapshot persistence
//! - `config`: Application configuration

pub mod config;
pub mod models;
pub mod storage;
pub mod store;
pub mod validation;

pub use config::Config;
pub use models::Contact;
pub use storage::{
    FilePersistence, MemoryPersistence, Persistence, StorageError, StorageResult, StorageStats,
};
pub use store::{filter_contacts, filter_key, ContactStore, StoreError, StoreResult};
pub use validation::{validate_entry, validate_name, validate_number, ValidationError};
