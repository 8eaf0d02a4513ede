//! Status command handler

use anyhow::Result;

use phonebook_core::{Config, ContactStore, FilePersistence};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &ContactStore<FilePersistence>, config: &Config, output: &Output) -> Result<()> {
    let persistence = store.persistence();
    let stats = persistence.stats();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "storage_key": config.storage_key,
                    "snapshot_path": persistence.path(),
                    "storage": {
                        "snapshot_exists": stats.snapshot_exists,
                        "snapshot_size": stats.snapshot_size,
                        "backup_exists": stats.backup_exists,
                        "backup_size": stats.backup_size,
                        "total_size": stats.total_size()
                    },
                    "counts": {
                        "contacts": store.len()
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.len());
        }
        OutputFormat::Human => {
            println!("Phonebook Status");
            println!("================");
            println!();
            println!("Storage:");
            println!("  Key:      {}", config.storage_key);
            println!("  Location: {}", persistence.path().display());
            println!("  Size:     {}", stats.total_size_human());
            if stats.backup_exists {
                println!(
                    "  Backup:   {} (a corrupted snapshot was set aside)",
                    persistence.backup_path().display()
                );
            }
            println!();
            println!("Contents:");
            println!("  Contacts: {}", store.len());
        }
    }

    Ok(())
}
