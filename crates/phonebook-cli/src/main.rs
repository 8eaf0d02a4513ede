//! Phonebook CLI
//!
//! Command-line interface for Phonebook - a local contact list.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use phonebook_core::{Config, ContactStore};

mod commands;
mod editor;
mod output;
mod tui;

use output::{Output, OutputFormat};

/// Environment variable holding the log level
pub(crate) const LOG_ENV: &str = "PHONEBOOK_LOG";

#[derive(Parser)]
#[command(name = "phonebook")]
#[command(about = "Phonebook - Local contact list")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Add a contact
    #[command(alias = "create")]
    Add {
        /// Contact name (letters, apostrophes, dashes and spaces)
        name: String,
        /// Phone number
        number: String,
    },
    /// List contacts
    #[command(alias = "ls")]
    List {
        /// Only show contacts whose name contains this text (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Delete a contact
    #[command(alias = "rm")]
    Delete {
        /// Contact ID (full ID or prefix)
        id: String,
    },
    /// Replace all contacts with the contents of a JSON file
    Import {
        /// File holding a JSON array of {id, name, number}
        file: PathBuf,
    },
    /// Print all contacts as JSON
    Export,
    /// Edit all contacts as JSON in $EDITOR
    Edit,
    /// Show status (storage location, contact count)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, storage_key, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    // TUI is the default when no command is given; it sets up its own logging
    let command = match cli.command {
        Some(Commands::Tui) | None => return tui::run(config),
        Some(command) => command,
    };

    init_cli_logging(&output);

    let mut store = ContactStore::open_with_config(&config)
        .with_context(|| format!("Failed to open contacts at {:?}", config.snapshot_path()))?;

    match command {
        Commands::Add { name, number } => {
            commands::contact::add(&mut store, name, number, &output)
        }
        Commands::List { filter } => commands::contact::list(&store, filter, &output),
        Commands::Delete { id } => commands::contact::delete(&mut store, id, &output),
        Commands::Import { file } => commands::contact::import(&mut store, &file, &output),
        Commands::Export => commands::contact::export(&store),
        Commands::Edit => commands::contact::edit(&mut store, &output),
        Commands::Status => commands::status::show(&store, &config, &output),
        Commands::Tui | Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize stderr logging for one-shot commands
///
/// Level comes from PHONEBOOK_LOG (default: warn, or error in quiet mode).
fn init_cli_logging(output: &Output) {
    let default_level = if output.is_quiet() { "error" } else { "warn" };
    let level = std::env::var(LOG_ENV).unwrap_or_else(|_| default_level.to_string());
    let env_filter = EnvFilter::new(format!(
        "phonebook_core={},phonebook_cli={}",
        level, level
    ));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from(["phonebook", "add", "Jacob Mercer", "+48 123-456-789"])
            .unwrap();
        match cli.command {
            Some(Commands::Add { name, number }) => {
                assert_eq!(name, "Jacob Mercer");
                assert_eq!(number, "+48 123-456-789");
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_parse_list_alias_with_filter() {
        let cli = Cli::try_parse_from(["phonebook", "ls", "--filter", "Ro"]).unwrap();
        match cli.command {
            Some(Commands::List { filter }) => assert_eq!(filter.as_deref(), Some("Ro")),
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["phonebook", "rm", "abc", "--json", "--config", "/tmp/c.toml"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Some(Commands::Delete { .. })));
    }

    #[test]
    fn test_no_command_defaults_to_tui() {
        let cli = Cli::try_parse_from(["phonebook"]).unwrap();
        assert!(cli.command.is_none());
    }
}
