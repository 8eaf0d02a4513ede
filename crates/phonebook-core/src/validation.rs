//! Entry validation for contact fields
//!
//! Names may contain Latin or Cyrillic letters, apostrophes, dashes and
//! spaces. Numbers loosely follow phone punctuation: an optional leading `+`,
//! digits, spaces, dashes, dots and parentheses.
//!
//! These checks belong to the input surfaces (CLI, TUI form). The store
//! accepts whatever it is given.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

const NAME_PATTERN: &str =
    r"^[a-zA-Zа-яА-Я]+(?:(?:[' -][a-zA-Zа-яА-Я ])?[a-zA-Zа-яА-Я]*)*$";

const NUMBER_PATTERN: &str = r"^\+?[0-9]{1,4}?[-.\s]?\(?[0-9]{1,3}?\)?[-.\s]?[0-9]{1,4}[-.\s]?[0-9]{1,4}[-.\s]?[0-9]{1,9}$";

/// Hint shown when a name is rejected
pub const NAME_HINT: &str = "Name may contain only letters, apostrophe, dash and spaces. \
     For example Adrian, Jacob Mercer, Charles de Batz de Castelmore d'Artagnan";

/// Hint shown when a number is rejected
pub const NUMBER_HINT: &str = "Phone number must be digits and can contain spaces, dashes, \
     parentheses and can start with +";

/// Errors raised when user input does not match the expected shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,

    #[error("Invalid name '{0}'. {hint}", hint = NAME_HINT)]
    InvalidName(String),

    #[error("Number is required")]
    EmptyNumber,

    #[error("Invalid number '{0}'. {hint}", hint = NUMBER_HINT)]
    InvalidNumber(String),
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NAME_PATTERN).expect("name pattern is valid"))
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NUMBER_PATTERN).expect("number pattern is valid"))
}

/// Validate a contact name
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if !name_regex().is_match(name) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Validate a phone number
pub fn validate_number(number: &str) -> Result<(), ValidationError> {
    if number.is_empty() {
        return Err(ValidationError::EmptyNumber);
    }
    if !number_regex().is_match(number) {
        return Err(ValidationError::InvalidNumber(number.to_string()));
    }
    Ok(())
}

/// Validate both fields of a new contact, name first
pub fn validate_entry(name: &str, number: &str) -> Result<(), ValidationError> {
    validate_name(name)?;
    validate_number(number)
}
