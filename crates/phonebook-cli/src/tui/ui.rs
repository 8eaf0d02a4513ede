//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::app::{App, FormField, InputMode};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let hint_height = if app.form.hint.is_some() { 2 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(hint_height),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_form(frame, app, chunks[0]);
    draw_form_hint(frame, app, chunks[1]);
    draw_filter(frame, app, chunks[2]);
    draw_contacts(frame, app, chunks[3]);
    draw_status_bar(frame, app, chunks[4]);

    if app.show_help {
        draw_help_overlay(frame);
    }

    if let Some(name) = &app.duplicate {
        draw_modal(
            frame,
            " Duplicate ",
            &format!("{} is already in contacts.", name),
            Color::Yellow,
        );
    }

    if let Some(message) = &app.error_message {
        draw_modal(frame, " Error ", message, Color::Red);
    }
}

/// Style for an input box border
fn input_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

/// Draw the Name / Number input boxes
fn draw_form(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let in_form = app.input_mode == InputMode::Form;
    let fields = [
        (FormField::Name, " Name ", &app.form.name, chunks[0]),
        (FormField::Number, " Number ", &app.form.number, chunks[1]),
    ];

    for (field, title, value, rect) in fields {
        let focused = in_form && app.form.field == field;
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(input_style(focused));
        frame.render_widget(Paragraph::new(value.as_str()).block(block), rect);

        if focused {
            let cursor_x = rect.x + 1 + value.chars().count() as u16;
            frame.set_cursor_position((cursor_x.min(rect.right().saturating_sub(2)), rect.y + 1));
        }
    }
}

/// Draw the validation hint under the form
fn draw_form_hint(frame: &mut Frame, app: &App, area: Rect) {
    let Some(hint) = &app.form.hint else {
        return;
    };

    let paragraph = Paragraph::new(hint.as_str())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Draw the filter input
fn draw_filter(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.input_mode == InputMode::Filter;

    let block = Block::default()
        .title(" Find contacts by name ")
        .borders(Borders::ALL)
        .border_style(input_style(focused));

    frame.render_widget(
        Paragraph::new(app.filter_input.as_str()).block(block),
        area,
    );

    if focused {
        let cursor_x = area.x + 1 + app.filter_input.chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Draw the filtered contact list
fn draw_contacts(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .visible
        .iter()
        .map(|contact| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{}: ", contact.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(contact.number.as_str()),
            ]))
        })
        .collect();

    let title = if app.filter.is_empty() {
        format!(" Contacts ({}) ", app.total)
    } else {
        format!(" Contacts ({}/{}) ", app.visible.len(), app.total)
    };

    let border_style = if app.input_mode == InputMode::Normal {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    if items.is_empty() {
        let text = if app.total == 0 {
            "No contacts yet. Press a to add one"
        } else {
            "No contacts match the filter"
        };
        let paragraph = Paragraph::new(Span::styled(
            text,
            Style::default().add_modifier(Modifier::DIM),
        ))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(app.selected));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        match app.input_mode {
            InputMode::Normal if app.can_undo() => {
                "a:add  /:filter  d:del  u:undo  ?:help  q:quit".to_string()
            }
            InputMode::Normal => "a:add  /:filter  d:del  ?:help  q:quit".to_string(),
            InputMode::Form => "Tab:switch field  Enter:add  Esc:back".to_string(),
            InputMode::Filter => format!(
                "Enter:keep  Esc:clear  ({} matches)",
                app.visible.len()
            ),
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Centered popup area of at most `width` x `height`
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

/// Draw a blocking message box
fn draw_modal(frame: &mut Frame, title: &str, message: &str, color: Color) {
    let area = popup_area(frame.area(), 50, 7);
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(""),
        Line::from(message),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color).add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let area = popup_area(frame.area(), 50, 20);

    // Clear the popup area
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  g/G         Jump to first/last contact"),
        Line::from(""),
        Line::from("Commands:"),
        Line::from("  a           Add contact"),
        Line::from("  d           Delete contact"),
        Line::from("  u           Undo delete"),
        Line::from("  /           Find contacts by name"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from("In the add form:"),
        Line::from("  Tab         Switch between Name and Number"),
        Line::from("  Enter       Add contact"),
        Line::from("  Esc         Back to the list"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, area);
}
