//! Phonebook TUI
//!
//! Terminal user interface for Phonebook.
//!
//! ## Layout
//!
//! - Top: add form (Name, Number)
//! - Below: "Find contacts by name" filter input
//! - Middle: contacts matching the filter
//! - Bottom: status bar
//!
//! ## Keys
//!
//! - a: Add contact (Tab switches field, Enter submits, Esc goes back)
//! - /: Filter by name (Enter keeps, Esc clears)
//! - j/k or ↑/↓: Move selection
//! - d: Delete selected contact
//! - u: Undo delete
//! - ?: Help
//! - q or Ctrl-C: Quit

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use phonebook_core::{Config, ContactStore, Persistence};

use app::{App, InputMode};

use crate::LOG_ENV;

/// Run the TUI application
pub fn run(config: Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if PHONEBOOK_LOG is set)
    init_tui_logging(&config);

    let mut store = ContactStore::open_with_config(&config)
        .with_context(|| format!("Failed to open contacts at {:?}", config.snapshot_path()))?;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = App::new(&store);

    let result = run_app(&mut terminal, &mut app, &mut store);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_app<B: Backend, P: Persistence>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &mut ContactStore<P>,
) -> Result<()> {
    loop {
        app.check_status_timeout();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };

        // Only handle key press events (not release)
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Modals and help swallow the next key
        if app.has_error() {
            app.clear_error();
            continue;
        }
        if app.duplicate.is_some() {
            app.dismiss_duplicate();
            continue;
        }
        if app.show_help {
            app.show_help = false;
            continue;
        }

        match app.input_mode {
            InputMode::Normal => handle_normal_mode(app, store, key.code, key.modifiers),
            InputMode::Form => handle_form_mode(app, store, key.code, key.modifiers),
            InputMode::Filter => handle_filter_mode(app, store, key.code, key.modifiers),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle key events in normal mode
fn handle_normal_mode<P: Persistence>(
    app: &mut App,
    store: &mut ContactStore<P>,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    match code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('g') | KeyCode::Home => app.move_to_first(),
        KeyCode::Char('G') | KeyCode::End => app.move_to_last(),

        KeyCode::Char('a') => app.enter_form_mode(),
        KeyCode::Char('/') => app.enter_filter_mode(),
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Err(e) = app.delete_selected(store) {
                app.set_error(format!("Failed to delete contact: {:#}", e));
            }
        }
        KeyCode::Char('u') => {
            if let Err(e) = app.undo_delete(store) {
                app.set_error(format!("Failed to undo delete: {:#}", e));
            }
        }

        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle key events in the add form
fn handle_form_mode<P: Persistence>(
    app: &mut App,
    store: &mut ContactStore<P>,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    match code {
        KeyCode::Esc => app.exit_input_mode(),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        KeyCode::Tab | KeyCode::BackTab => app.toggle_form_field(),
        KeyCode::Enter => {
            if let Err(e) = app.submit_form(store) {
                app.set_error(format!("Failed to add contact: {:#}", e));
            }
        }

        KeyCode::Char(c) => app.insert_char(c),
        KeyCode::Backspace => app.delete_char(),

        _ => {}
    }
}

/// Handle key events in filter mode
fn handle_filter_mode<P: Persistence>(
    app: &mut App,
    store: &ContactStore<P>,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    match code {
        // Cancel filter
        KeyCode::Esc => {
            app.exit_input_mode();
            app.clear_filter(store);
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        // Confirm filter (stay in filtered view)
        KeyCode::Enter => app.exit_input_mode(),

        KeyCode::Char(c) => {
            app.insert_char(c);
            app.apply_filter(store);
        }
        KeyCode::Backspace => {
            app.delete_char();
            app.apply_filter(store);
        }

        _ => {}
    }
}

/// Initialize logging for TUI mode
///
/// Only initializes if PHONEBOOK_LOG is set, since stderr belongs to the
/// terminal UI. Logs to config.log_file or {data_dir}/debug.log.
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "phonebook_core={},phonebook_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
