//! Application state and logic

use phonebook_core::{
    filter_key, validate_entry, Contact, ContactStore, Persistence, StoreError, ValidationError,
};

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Typing into the add form (after pressing a)
    Form,
    /// Filter/search mode (after pressing /)
    Filter,
}

/// Which add-form field has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Number,
}

impl FormField {
    /// Switch to the other field
    pub fn toggle(self) -> Self {
        match self {
            FormField::Name => FormField::Number,
            FormField::Number => FormField::Name,
        }
    }
}

/// The two-field add form
#[derive(Debug, Clone)]
pub struct AddForm {
    pub name: String,
    pub number: String,
    pub field: FormField,
    /// Validation message for the last rejected submit
    pub hint: Option<String>,
}

impl Default for AddForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            number: String::new(),
            field: FormField::Name,
            hint: None,
        }
    }
}

impl AddForm {
    /// The buffer of the focused field
    fn active_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Name => &mut self.name,
            FormField::Number => &mut self.number,
        }
    }

    /// Reset both fields
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Add form contents
    pub form: AddForm,
    /// Filter text as typed
    pub filter_input: String,
    /// Lower-cased filter actually applied
    pub filter: String,
    /// Contacts passing the filter, in store order
    pub visible: Vec<Contact>,
    /// Total number of contacts in the store
    pub total: usize,
    /// Currently selected row in `visible`
    pub selected: usize,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<std::time::Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Name shown in the duplicate-name modal
    pub duplicate: Option<String>,
    /// Error shown in the error modal
    pub error_message: Option<String>,
    /// Last deleted contact and its position in the store (for undo)
    deleted: Option<(usize, Contact)>,
}

impl App {
    /// Create a new app showing every contact in `store`
    pub fn new<P: Persistence>(store: &ContactStore<P>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            form: AddForm::default(),
            filter_input: String::new(),
            filter: String::new(),
            visible: store.contacts().to_vec(),
            total: store.len(),
            selected: 0,
            status_message: None,
            status_message_time: None,
            show_help: false,
            duplicate: None,
            error_message: None,
            deleted: None,
        }
    }

    /// Re-read the filtered view from the store
    pub fn refresh<P: Persistence>(&mut self, store: &ContactStore<P>) {
        self.visible = store.filter(&self.filter);
        self.total = store.len();
        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    // ==================== Messages ====================

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(std::time::Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > std::time::Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Show an error in a modal
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Close the duplicate-name modal
    pub fn dismiss_duplicate(&mut self) {
        self.duplicate = None;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ==================== Navigation ====================

    /// Get the currently selected contact
    pub fn current_contact(&self) -> Option<&Contact> {
        self.visible.get(self.selected)
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected < self.visible.len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    pub fn move_to_first(&mut self) {
        self.selected = 0;
    }

    pub fn move_to_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }

    // ==================== Input modes ====================

    /// Start typing into the add form
    pub fn enter_form_mode(&mut self) {
        self.input_mode = InputMode::Form;
    }

    /// Start typing a filter
    pub fn enter_filter_mode(&mut self) {
        self.input_mode = InputMode::Filter;
    }

    /// Return to normal mode, keeping any typed text
    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Switch focus between the form fields
    pub fn toggle_form_field(&mut self) {
        self.form.field = self.form.field.toggle();
    }

    /// Insert a character into the active input
    pub fn insert_char(&mut self, c: char) {
        match self.input_mode {
            InputMode::Form => self.form.active_mut().push(c),
            InputMode::Filter => self.filter_input.push(c),
            InputMode::Normal => {}
        }
    }

    /// Delete the last character of the active input
    pub fn delete_char(&mut self) {
        match self.input_mode {
            InputMode::Form => {
                self.form.active_mut().pop();
            }
            InputMode::Filter => {
                self.filter_input.pop();
            }
            InputMode::Normal => {}
        }
    }

    // ==================== Filtering ====================

    /// Apply the typed filter text
    pub fn apply_filter<P: Persistence>(&mut self, store: &ContactStore<P>) {
        self.filter = filter_key(&self.filter_input);
        self.selected = 0;
        self.refresh(store);
    }

    /// Drop the filter and show everything
    pub fn clear_filter<P: Persistence>(&mut self, store: &ContactStore<P>) {
        self.filter_input.clear();
        self.apply_filter(store);
    }

    // ==================== Mutations ====================

    /// Submit the add form
    ///
    /// Invalid input sets a hint and focuses the offending field. A duplicate
    /// name opens the duplicate modal and keeps the typed values. Storage
    /// failures are returned.
    pub fn submit_form<P: Persistence>(
        &mut self,
        store: &mut ContactStore<P>,
    ) -> anyhow::Result<()> {
        let name = self.form.name.clone();
        let number = self.form.number.clone();

        if let Err(err) = validate_entry(&name, &number) {
            self.form.field = match err {
                ValidationError::EmptyName | ValidationError::InvalidName(_) => FormField::Name,
                ValidationError::EmptyNumber | ValidationError::InvalidNumber(_) => {
                    FormField::Number
                }
            };
            self.form.hint = Some(err.to_string());
            return Ok(());
        }

        match store.add(name, number) {
            Ok(contact) => {
                self.form.clear();
                self.exit_input_mode();
                self.refresh(store);
                if let Some(idx) = self.visible.iter().position(|c| c.id == contact.id) {
                    self.selected = idx;
                }
                self.set_status(format!("Added '{}'", contact.name));
                Ok(())
            }
            Err(StoreError::DuplicateName(name)) => {
                self.form.hint = None;
                self.duplicate = Some(name);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Delete the selected contact and remember it for undo
    pub fn delete_selected<P: Persistence>(
        &mut self,
        store: &mut ContactStore<P>,
    ) -> anyhow::Result<()> {
        let Some(contact) = self.current_contact().cloned() else {
            return Ok(());
        };

        let position = store
            .contacts()
            .iter()
            .position(|c| c.id == contact.id)
            .unwrap_or(store.len());

        if let Some(removed) = store.delete(&contact.id)? {
            self.set_status(format!("Deleted '{}'. Press u to undo", removed.name));
            self.deleted = Some((position, removed));
        }
        self.refresh(store);
        Ok(())
    }

    /// Put the last deleted contact back where it was
    pub fn undo_delete<P: Persistence>(
        &mut self,
        store: &mut ContactStore<P>,
    ) -> anyhow::Result<()> {
        let Some((position, contact)) = self.deleted.take() else {
            self.set_status("Nothing to undo");
            return Ok(());
        };

        if store.find_by_name(&contact.name).is_some() {
            self.set_status(format!(
                "Cannot restore '{}': the name is taken again",
                contact.name
            ));
            return Ok(());
        }

        let mut next = store.contacts().to_vec();
        next.insert(position.min(next.len()), contact.clone());
        if let Err(err) = store.replace_all(next) {
            // Keep it so the user can retry
            self.deleted = Some((position, contact));
            return Err(err.into());
        }

        self.refresh(store);
        self.set_status(format!("Restored '{}'", contact.name));
        Ok(())
    }

    /// Whether an undo is available
    pub fn can_undo(&self) -> bool {
        self.deleted.is_some()
    }
}
