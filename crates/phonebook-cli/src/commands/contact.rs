//! Contact command handlers

use std::collections::HashSet;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use phonebook_core::{
    filter_key, validate_entry, Contact, ContactStore, Persistence, StoreError,
};

use crate::editor::{confirm, edit_until_valid, open_in_editor};
use crate::output::Output;

/// Add a new contact
pub fn add<P: Persistence>(
    store: &mut ContactStore<P>,
    name: String,
    number: String,
    output: &Output,
) -> Result<()> {
    validate_entry(&name, &number)?;

    let contact = match store.add(name, number) {
        Ok(contact) => contact,
        Err(err @ StoreError::DuplicateName(_)) => return Err(anyhow!(err)),
        Err(err) => return Err(err).context("Failed to add contact"),
    };

    output.success(&format!("Added contact: {}", contact.id));
    output.print_contact(&contact);

    Ok(())
}

/// List contacts, optionally filtered by name
pub fn list<P: Persistence>(
    store: &ContactStore<P>,
    filter: Option<String>,
    output: &Output,
) -> Result<()> {
    let needle = filter_key(filter.as_deref().unwrap_or(""));
    output.print_contacts(&store.filter(&needle));
    Ok(())
}

/// Delete a contact
pub fn delete<P: Persistence>(
    store: &mut ContactStore<P>,
    id: String,
    output: &Output,
) -> Result<()> {
    let contact = resolve_contact(&id, store.contacts())?.clone();

    if output.should_prompt() {
        println!("Delete contact: {} - {}", contact.short_id(), contact.name);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .delete(&contact.id)
        .context("Failed to delete contact")?;

    output.success(&format!("Deleted contact: {}", contact.name));

    Ok(())
}

/// Replace every contact with the contents of a JSON file
pub fn import<P: Persistence>(
    store: &mut ContactStore<P>,
    file: &Path,
    output: &Output,
) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {:?}", file))?;
    let contacts = parse_contacts(&content)
        .with_context(|| format!("Failed to parse contacts from {:?}", file))?;

    if output.should_prompt() && !store.is_empty() {
        println!(
            "Replace {} existing contact(s) with {} from {}?",
            store.len(),
            contacts.len(),
            file.display()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let count = contacts.len();
    store
        .replace_all(contacts)
        .context("Failed to import contacts")?;

    output.success(&format!("Imported {} contact(s)", count));
    Ok(())
}

/// Print the whole collection in snapshot format
pub fn export<P: Persistence>(store: &ContactStore<P>) -> Result<()> {
    let json =
        serde_json::to_string_pretty(store.contacts()).context("Failed to serialize contacts")?;
    println!("{}", json);
    Ok(())
}

/// Bulk-edit the collection in $EDITOR
pub fn edit<P: Persistence>(store: &mut ContactStore<P>, output: &Output) -> Result<()> {
    let original =
        serde_json::to_string_pretty(store.contacts()).context("Failed to serialize contacts")?;

    let contacts = edit_until_valid(&original, open_in_editor, parse_edited, |err| {
        eprintln!("Edited contacts are not valid: {:#}", err);
        confirm("Re-open the editor?")
    })?;

    if contacts.as_slice() == store.contacts() {
        output.message("No changes.");
        return Ok(());
    }

    let count = contacts.len();
    store
        .replace_all(contacts)
        .context("Failed to save edited contacts")?;

    output.success(&format!("Saved {} contact(s)", count));
    Ok(())
}

/// Parse a snapshot-format JSON array
fn parse_contacts(content: &str) -> Result<Vec<Contact>> {
    let contacts: Vec<Contact> =
        serde_json::from_str(content).context("Expected a JSON array of {id, name, number}")?;
    Ok(contacts)
}

/// Parse hand-edited contacts, holding them to the same rules as `add`
fn parse_edited(content: &str) -> Result<Vec<Contact>> {
    let contacts = parse_contacts(content)?;

    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for contact in &contacts {
        if contact.id.is_empty() {
            bail!("Contact '{}' has an empty id", contact.name);
        }
        if !ids.insert(contact.id.as_str()) {
            bail!("Id {} is used more than once", contact.id);
        }
        validate_entry(&contact.name, &contact.number)?;
        if !names.insert(contact.name.as_str()) {
            bail!("{}", StoreError::DuplicateName(contact.name.clone()));
        }
    }

    Ok(contacts)
}

/// Find a contact by full ID or unique ID prefix
fn resolve_contact<'a>(id: &str, contacts: &'a [Contact]) -> Result<&'a Contact> {
    if let Some(contact) = contacts.iter().find(|c| c.id == id) {
        return Ok(contact);
    }

    let matches: Vec<_> = contacts.iter().filter(|c| c.id.starts_with(id)).collect();

    match matches.len() {
        0 => bail!("No contact found matching: {}", id),
        1 => Ok(matches[0]),
        _ => {
            eprintln!("Multiple contacts match '{}':", id);
            for contact in &matches {
                eprintln!("  {} - {}", contact.id, contact.name);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
