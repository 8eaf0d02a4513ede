//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use phonebook_core::Contact;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single contact
    pub fn print_contact(&self, contact: &Contact) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:     {}", contact.id);
                println!("Name:   {}", contact.name);
                println!("Number: {}", contact.number);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(contact).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", contact.id);
            }
        }
    }

    /// Print a list of contacts
    pub fn print_contacts(&self, contacts: &[Contact]) {
        match self.format {
            OutputFormat::Human => {
                if contacts.is_empty() {
                    println!("No contacts found.");
                    return;
                }
                for contact in contacts {
                    println!(
                        "{} | {:<30} | {}",
                        contact.short_id(),
                        truncate(&contact.name, 30),
                        contact.number
                    );
                }
                println!("\n{} contact(s)", contacts.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(contacts).unwrap());
            }
            OutputFormat::Quiet => {
                for contact in contacts {
                    println!("{}", contact.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
