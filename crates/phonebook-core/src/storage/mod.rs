//! Storage layer
//!
//! Handles persistence of the contact snapshot.
//!
//! ## Architecture
//!
//! - **Persistence**: the port the store saves through (`load`/`save`)
//! - **FilePersistence**: JSON snapshot on disk, written atomically
//! - **MemoryPersistence**: in-memory slot for tests and throwaway sessions

pub mod error;
pub mod memory;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryPersistence;
pub use persistence::{FilePersistence, Persistence, StorageStats};
