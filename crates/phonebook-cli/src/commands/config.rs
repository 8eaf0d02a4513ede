//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use phonebook_core::config::{validate_storage_key, DEFAULT_STORAGE_KEY};
use phonebook_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "storage_key": config.storage_key,
                    "log_file": config.log_file,
                    "snapshot_path": config.snapshot_path(),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.snapshot_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:    {}", config.data_dir.display());
            println!("  storage_key: {}", config.storage_key);
            println!(
                "  log_file:    {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
            println!("Contacts:    {}", config.snapshot_path().display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply a single `key = value` change
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "storage_key" => {
            config.storage_key = if value.is_empty() || value == "none" {
                DEFAULT_STORAGE_KEY.to_string()
            } else {
                validate_storage_key(value)?;
                value.to_string()
            };
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, storage_key, log_file",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "data_dir", "/srv/phonebook").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/phonebook"));

        apply(&mut config, "storage_key", "work").unwrap();
        assert_eq!(config.storage_key, "work");

        apply(&mut config, "log_file", "/tmp/pb.log").unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/pb.log")));
    }

    #[test]
    fn test_apply_none_resets() {
        let mut config = Config::default();
        apply(&mut config, "storage_key", "work").unwrap();
        apply(&mut config, "log_file", "/tmp/pb.log").unwrap();

        apply(&mut config, "storage_key", "none").unwrap();
        apply(&mut config, "log_file", "").unwrap();

        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_apply_rejects_path_as_storage_key() {
        let mut config = Config::default();
        assert!(apply(&mut config, "storage_key", "../elsewhere").is_err());
        assert!(apply(&mut config, "storage_key", "..").is_err());
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_apply_unknown_key() {
        let mut config = Config::default();
        let err = apply(&mut config, "sync_url", "ws://x").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
    }
}
