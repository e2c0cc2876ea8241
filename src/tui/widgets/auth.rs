//! Auth Widget
//!
//! Modal dialog for signing up or logging in.

use crate::tui::app::{App, AuthField};
use crate::tui::theme::{Icons, Theme};
use crate::tui::ui::centered_rect;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the auth modal
pub fn render_auth(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Access Your Summaries ")
        .borders(Borders::ALL)
        .border_style(Theme::border_focused());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Subtitle
            Constraint::Length(3), // Email
            Constraint::Length(3), // Password
            Constraint::Min(2),    // Footer
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Sign up or log in to save your summaries for later",
            Theme::text_secondary(),
        ))),
        chunks[0],
    );

    render_field(frame, chunks[1], app, AuthField::Email);
    render_field(frame, chunks[2], app, AuthField::Password);
    render_footer(frame, chunks[3], app);
}

fn render_field(frame: &mut Frame, area: Rect, app: &App, field: AuthField) {
    let focused = app.auth_form.field == field;
    let (title, input) = match field {
        AuthField::Email => (" Email ", &app.auth_form.email),
        AuthField::Password => (" Password ", &app.auth_form.password),
    };

    let block = Block::default()
        .title(if focused {
            format!("{}{}", Icons::SELECTED, title)
        } else {
            title.to_string()
        })
        .borders(Borders::ALL)
        .border_style(Theme::pane_border(focused));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(input, inner);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![Line::from(vec![
        Span::styled("[Enter]", Theme::shortcut_key()),
        Span::styled(" Log In ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+N]", Theme::shortcut_key()),
        Span::styled(" Sign Up ", Theme::shortcut_desc()),
        Span::styled("[Tab]", Theme::shortcut_key()),
        Span::styled(" Next field ", Theme::shortcut_desc()),
        Span::styled("[Esc]", Theme::shortcut_key()),
        Span::styled(" Close", Theme::shortcut_desc()),
    ])];

    if !app.auth_enabled() {
        lines.push(Line::from(Span::styled(
            "Sign-in is disabled: set FIREBASE_API_KEY",
            Theme::error(),
        )));
    } else if app.auth_form.pending {
        lines.push(Line::from(Span::styled("Contacting identity provider...", Theme::active())));
    }

    frame.render_widget(Paragraph::new(lines), area);
}
