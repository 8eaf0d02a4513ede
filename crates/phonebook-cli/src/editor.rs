//! Interactive editing support
//!
//! `phonebook edit` writes the contact list to a temporary JSON file, runs
//! $EDITOR on it and parses the result. A result that does not parse can be
//! reopened; if the user gives up, the file is kept so the edits survive.

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tempfile::TempPath;

/// Edit `initial` until `parse` accepts it
///
/// `open` runs the editor on the file. When `parse` fails, `retry` is asked
/// whether to reopen the editor; declining keeps the file and returns the
/// parse error with its location.
pub fn edit_until_valid<T>(
    initial: &str,
    mut open: impl FnMut(&Path) -> Result<()>,
    parse: impl Fn(&str) -> Result<T>,
    mut retry: impl FnMut(&anyhow::Error) -> Result<bool>,
) -> Result<T> {
    let path = create_edit_file(initial)?;
    let mut edited = false;

    loop {
        if let Err(err) = open(&path) {
            // Nothing to save before the first round
            return if edited {
                Err(err.context(keep_edit_file(path)?))
            } else {
                Err(err)
            };
        }
        edited = true;

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read edited file: {:?}", path))?;

        match parse(&content) {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !retry(&err)? {
                    return Err(err.context(keep_edit_file(path)?));
                }
            }
        }
    }
}

/// Write `content` to a fresh `phonebook-edit-*.json` file, removed on drop
fn create_edit_file(content: &str) -> Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix("phonebook-edit-")
        .suffix(".json")
        .tempfile()
        .context("Failed to create temp file for editing")?;

    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .context("Failed to write temp file for editing")?;

    // Close our handle so the editor has the file to itself
    Ok(file.into_temp_path())
}

/// Persist the edit file and describe where it is
fn keep_edit_file(path: TempPath) -> Result<String> {
    let kept: PathBuf = path.keep().context("Failed to keep edited file")?;
    Ok(format!("Your edits were kept in {}", kept.display()))
}

/// Run the user's editor on `path` and wait for it to exit
pub fn open_in_editor(path: &Path) -> Result<()> {
    let editor = find_editor()?;
    let (program, args) = split_editor(&editor);

    let status = Command::new(program)
        .args(args)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;

    if !status.success() {
        bail!(
            "Editor '{}' exited with non-zero status. Check that your editor is configured correctly.",
            editor
        );
    }

    Ok(())
}

/// Split an editor setting like `code --wait` into program and arguments
fn split_editor(editor: &str) -> (&str, Vec<&str>) {
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or(editor);
    (program, parts.collect())
}

/// Find the user's preferred editor
///
/// Uses $EDITOR, $VISUAL, or falls back to common editors.
fn find_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.trim().is_empty() {
                return Ok(editor);
            }
        }
    }

    let common_editors = ["nano", "vim", "vi", "emacs", "notepad"];

    for editor in common_editors {
        if command_exists(editor) {
            return Ok(editor.to_string());
        }
    }

    bail!(
        "No editor found. Set $EDITOR environment variable.\n\
         Example: export EDITOR=nano"
    )
}

/// Check if a command exists in PATH
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    input == "y" || input == "yes"
}
