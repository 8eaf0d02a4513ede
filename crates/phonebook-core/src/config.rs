//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/phonebook/config.toml)
//! 3. Environment variables (PHONEBOOK_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "PHONEBOOK";

/// Key of the persistence slot when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "myPhonebook";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (contact snapshot, logs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Name of the persistence slot inside `data_dir`
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Log file for the TUI (defaults to `data_dir/debug.log`)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: default_storage_key(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (PHONEBOOK_DATA_DIR, PHONEBOOK_STORAGE_KEY)
    /// 2. Config file (~/.config/phonebook/config.toml or PHONEBOOK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(cli_path: Option<&PathBuf>) -> Result<Self> {
        match cli_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // PHONEBOOK_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // PHONEBOOK_STORAGE_KEY (empty keeps the current key)
        if let Ok(val) = std::env::var(format!("{}_STORAGE_KEY", ENV_PREFIX)) {
            if !val.is_empty() {
                self.storage_key = val;
            }
        }
    }

    /// Check values that the file or environment may have set
    fn validate(&self) -> Result<()> {
        validate_storage_key(&self.storage_key)
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with PHONEBOOK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("phonebook")
            .join("config.toml")
    }

    /// Get the path to the contact snapshot
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.storage_key))
    }

    /// Get the path to the TUI log file
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("phonebook")
}

/// Check that a storage key names a file inside `data_dir`
///
/// The key becomes `<data_dir>/<key>.json`, so it must be a plain,
/// non-empty name without path separators.
pub fn validate_storage_key(key: &str) -> Result<()> {
    if key.is_empty() || key == "." || key == ".." {
        bail!("Invalid storage_key '{}': must be a plain name", key);
    }
    if key.contains(|c: char| c == '/' || c == '\\') {
        bail!("Invalid storage_key '{}': must be a plain name, not a path", key);
    }
    Ok(())
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "PHONEBOOK_DATA_DIR",
        "PHONEBOOK_STORAGE_KEY",
        "PHONEBOOK_CONFIG",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage_key, "myPhonebook");
        assert!(config.log_file.is_none());
        assert!(config.data_dir.ends_with("phonebook"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config {
            data_dir: PathBuf::from("/data/phonebook"),
            storage_key: "myPhonebook".to_string(),
            log_file: None,
        };

        assert_eq!(
            config.snapshot_path(),
            PathBuf::from("/data/phonebook/myPhonebook.json")
        );
        assert_eq!(config.log_path(), PathBuf::from("/data/phonebook/debug.log"));
    }

    #[test]
    fn test_log_path_override() {
        let config = Config {
            log_file: Some(PathBuf::from("/tmp/phonebook.log")),
            ..Config::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/tmp/phonebook.log"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("PHONEBOOK_DATA_DIR", "/tmp/phonebook-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/phonebook-test"));
    }

    #[test]
    fn test_env_override_storage_key() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("PHONEBOOK_STORAGE_KEY", "work");
        config.apply_env_overrides();
        assert_eq!(config.storage_key, "work");
        assert!(config.snapshot_path().ends_with("work.json"));

        // Empty string keeps the current key
        env::set_var("PHONEBOOK_STORAGE_KEY", "");
        config.apply_env_overrides();
        assert_eq!(config.storage_key, "work");
    }

    #[test]
    fn test_validate_storage_key() {
        assert!(validate_storage_key("myPhonebook").is_ok());
        assert!(validate_storage_key("work.2024").is_ok());

        assert!(validate_storage_key("").is_err());
        assert!(validate_storage_key("..").is_err());
        assert!(validate_storage_key("../elsewhere").is_err());
        assert!(validate_storage_key("a/b").is_err());
        assert!(validate_storage_key("a\\b").is_err());
    }

    #[test]
    fn test_env_storage_key_with_path_is_rejected() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var("PHONEBOOK_STORAGE_KEY", "../outside");
        let err = Config::load_from_str("").unwrap_err();
        assert!(err.to_string().contains("storage_key"));
    }

    #[test]
    fn test_file_storage_key_with_path_is_rejected() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("PHONEBOOK_DATA_DIR", temp_dir.path().join("data"));

        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "storage_key = \"../../etc/contacts\"\n").unwrap();

        assert!(Config::load_from_path(&config_path).is_err());
        assert!(Config::load_from_str(r#"storage_key = "a/b""#).is_err());
    }

    #[test]
    fn test_config_file_path_override() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var("PHONEBOOK_CONFIG", "/etc/phonebook.toml");
        assert_eq!(
            Config::config_file_path(),
            PathBuf::from("/etc/phonebook.toml")
        );
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/phonebook"),
            storage_key: "family".to_string(),
            log_file: Some(PathBuf::from("/var/log/phonebook.log")),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("storage_key"));
        assert!(toml_str.contains("log_file"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.storage_key, config.storage_key);
        assert_eq!(parsed.log_file, config.log_file);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            storage_key = "friends"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.storage_key, "friends");
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_load_from_str_defaults_missing_keys() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_str("").unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("PHONEBOOK_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        // Data directory is created on load
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("conf").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            storage_key: "office".to_string(),
            log_file: None,
        };
        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_with_cli_override(Some(&config_path)).unwrap();
        assert_eq!(loaded.data_dir, config.data_dir);
        assert_eq!(loaded.storage_key, "office");
    }
}
