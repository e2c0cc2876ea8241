//! UI Rendering
//!
//! Main UI layout and rendering logic for the TUI.

use crate::tui::app::{App, Focus, View};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;
use crate::workflow::WorkflowStage;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the main UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // File panel
            Constraint::Length(4), // Progress
            Constraint::Min(6),    // Summary
            Constraint::Length(1), // Notices
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_file_panel(frame, chunks[1], app);
    widgets::render_progress(frame, chunks[2], &app.stage);
    render_summary(frame, chunks[3], app);
    render_notices(frame, chunks[4], app);
    render_status_bar(frame, chunks[5], app);

    match app.view {
        View::Auth => widgets::render_auth(frame, app),
        View::Help => render_help(frame),
        View::Main => {}
    }
}

/// Render the header with the sign-in badge
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let account = match &app.session {
        Some(session) => Span::styled(format!(" {} ", session.email), Theme::badge_success()),
        None => Span::styled(" Not signed in ", Theme::text_dim()),
    };

    let title_text = vec![Line::from(vec![
        Span::raw("🚀 "),
        Span::styled("NotePilot", Theme::title()),
        Span::styled(" Study notes from your PDFs", Theme::text_secondary()),
        Span::raw("  "),
        Span::styled(format!(" {} ", app.config.backend.format), Theme::badge_primary()),
        Span::raw(" "),
        account,
    ])];

    let title = Paragraph::new(title_text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

    frame.render_widget(title, area);
}

/// Path input, staged file and the selector's last message
fn render_file_panel(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.view == View::Main && app.focus == Focus::FilePath;
    let block = Block::default()
        .title(" Upload Your PDF ")
        .borders(Borders::ALL)
        .border_style(Theme::pane_border(focused));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    frame.render_widget(&app.path_input, rows[0]);

    let staged = match app.selector.staged() {
        Some(file) => Line::from(vec![
            Span::raw(format!("{} ", Icons::DOCUMENT)),
            Span::styled(file.name.clone(), Theme::heading()),
            Span::styled(format!("  {}", file.display_size()), Theme::text_secondary()),
        ]),
        None => Line::from(vec![
            Span::styled("Type a path or drag and drop", Theme::text_secondary()),
            Span::styled("  PDF files only", Theme::text_dim()),
        ]),
    };
    frame.render_widget(Paragraph::new(staged), rows[1]);

    if let Some(status) = app.selector.status() {
        frame.render_widget(
            Paragraph::new(Span::styled(status.message.clone(), Theme::notice(status.severity))),
            rows[2],
        );
    }
}

/// Render the summary pane
fn render_summary(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.view == View::Main && app.focus == Focus::Summary;
    let block = Block::default()
        .title(" Your Summary ")
        .borders(Borders::ALL)
        .border_style(Theme::pane_border(focused));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(summary) = &app.summary else {
        let hint = if app.is_generating() {
            "Generating Summary..."
        } else {
            "Your summary will appear here."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, Theme::text_dim())).alignment(Alignment::Center),
            inner,
        );
        return;
    };

    // Notebook paper: a red margin rule down the left edge
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let rule: Vec<Line> = (0..columns[0].height)
        .map(|_| Line::from(Span::styled("│", Theme::margin_rule())))
        .collect();
    frame.render_widget(Paragraph::new(rule), columns[0]);

    let lines: Vec<Line> = summary
        .text
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), Theme::text())))
        .collect();

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset, 0));
    frame.render_widget(paragraph, columns[1]);
}

fn render_notices(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(notice) = app.visible_notices().last() {
        let line = Line::from(Span::styled(
            format!(" {}", notice.message),
            Theme::notice(notice.severity),
        ));
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status = match &app.stage {
        WorkflowStage::Idle => Span::styled("Ready", Theme::text_secondary()),
        WorkflowStage::Complete => Span::styled("Complete", Theme::complete()),
        WorkflowStage::Failed(_) => Span::styled("Failed", Theme::error()),
        WorkflowStage::Cancelled => Span::styled("Cancelled", Theme::text_dim()),
        _ => Span::styled("Generating Summary...", Theme::active()),
    };

    let shortcuts = vec![
        Span::styled(" [Ctrl+G]", Theme::shortcut_key()),
        Span::styled(" Generate ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+Y]", Theme::shortcut_key()),
        Span::styled(" Copy ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+S]", Theme::shortcut_key()),
        Span::styled(" Save ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+A]", Theme::shortcut_key()),
        Span::styled(" Account ", Theme::shortcut_desc()),
        Span::styled("[Ctrl+Q]", Theme::shortcut_key()),
        Span::styled(" Quit ", Theme::shortcut_desc()),
        Span::styled("[F1]", Theme::shortcut_key()),
        Span::styled(" Help", Theme::shortcut_desc()),
    ];

    let line = Line::from(
        std::iter::once(status)
            .chain(std::iter::once(Span::raw(" │ ")))
            .chain(shortcuts)
            .collect::<Vec<_>>(),
    );

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help modal
fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let entries = [
        ("Enter        ", "Stage the typed path / Log in"),
        ("Paste / drop ", "Stage a dropped PDF"),
        ("Ctrl+G       ", "Generate summary"),
        ("Esc          ", "Cancel generation / Close modal"),
        ("Ctrl+Y       ", "Copy summary"),
        ("Ctrl+S       ", "Save summary to StudyMaterial.txt"),
        ("Ctrl+A       ", "Sign up or log in"),
        ("Tab          ", "Switch pane / field"),
        ("↑/↓ PgUp/PgDn", "Scroll summary"),
        ("Ctrl+Q       ", "Quit application"),
    ];

    let mut help_lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Theme::heading())),
        Line::from(""),
    ];
    help_lines.extend(entries.iter().map(|(key, desc)| {
        Line::from(vec![
            Span::styled(*key, Theme::shortcut_key()),
            Span::raw(" "),
            Span::styled(*desc, Theme::text()),
        ])
    }));
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled("Press any key to close", Theme::text_dim())));

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );

    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::SummaryArtifact;
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[tokio::test]
    async fn test_renders_summary_text() {
        let config = Config::from_lookup(|_| None).unwrap();
        let mut app = App::new(config);
        app.summary = Some(SummaryArtifact::new(None, "Photosynthesis converts light"));
        app.stage = WorkflowStage::Complete;

        let text = rendered_text(&app);
        assert!(text.contains("Your Summary"));
        assert!(text.contains("Photosynthesis converts light"));
    }
}
