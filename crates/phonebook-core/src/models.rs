//! Data models for Phonebook
//!
//! Defines the core data structure: Contact.
//! The serialized form (`id`, `name`, `number`) is also the on-disk
//! snapshot format, so field names must not change.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A phonebook entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    /// Opaque unique identifier, never reused
    pub id: String,
    /// Display name, unique within a collection
    pub name: String,
    /// Phone number as typed
    pub number: String,
}

impl Contact {
    /// Create a new contact with a freshly generated ID
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            number: number.into(),
        }
    }

    /// Create a contact with a specific ID (for loading from storage)
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            number: number.into(),
        }
    }

    /// Check whether the name contains `needle`, ignoring case
    ///
    /// `needle` is expected to be lower-cased already.
    pub fn name_matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }

    /// First eight characters of the ID, for compact display
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_new() {
        let contact = Contact::new("Ann", "123");
        assert_eq!(contact.name, "Ann");
        assert_eq!(contact.number, "123");
        assert!(Uuid::parse_str(&contact.id).is_ok());
    }

    #[test]
    fn test_contact_ids_are_unique() {
        let a = Contact::new("Ann", "123");
        let b = Contact::new("Ann", "123");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_contact_with_id() {
        let contact = Contact::with_id("id-1", "Bob", "456");
        assert_eq!(contact.id, "id-1");
        assert_eq!(contact.name, "Bob");
    }

    #[test]
    fn test_name_matches() {
        let contact = Contact::new("Rosie Simpson", "459-12-56");
        assert!(contact.name_matches("rosie"));
        assert!(contact.name_matches("simp"));
        assert!(contact.name_matches(""));
        assert!(!contact.name_matches("hermione"));
    }

    #[test]
    fn test_name_matches_cyrillic() {
        let contact = Contact::new("Анна Петрова", "+380 44 123 4567");
        assert!(contact.name_matches("анна"));
        assert!(contact.name_matches("петр"));
    }

    #[test]
    fn test_short_id() {
        let contact = Contact::with_id("abcdefghijkl", "Ann", "1");
        assert_eq!(contact.short_id(), "abcdefgh");

        let short = Contact::with_id("abc", "Ann", "1");
        assert_eq!(short.short_id(), "abc");
    }

    #[test]
    fn test_serialized_field_names() {
        let contact = Contact::with_id("id-1", "Ann", "123");
        let json = serde_json::to_string(&contact).unwrap();
        assert_eq!(json, r#"{"id":"id-1","name":"Ann","number":"123"}"#);
    }

    #[test]
    fn test_deserialize_snapshot_entry() {
        let json = r#"{"id":"eIOP3pW8Jv2mGnQCzAb3d","name":"Hermione Kline","number":"443-89-12"}"#;
        let contact: Contact = serde_json::from_str(json).unwrap();
        assert_eq!(contact.id, "eIOP3pW8Jv2mGnQCzAb3d");
        assert_eq!(contact.name, "Hermione Kline");
        assert_eq!(contact.number, "443-89-12");
    }
}
