//! Terminal User Interface Module
//!
//! Interactive front end for NotePilot, built with Ratatui.
//!
//! # Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  🚀 NotePilot  Study notes from your PDFs   [cheat-sheet] [me]  │
//! ├─ Upload Your PDF ───────────────────────────────────────────────┤
//! │ > ~/courses/bio101/lecture3.pdf                                  │
//! │ 📄 lecture3.pdf  1.42 MB                                          │
//! │ Selected: lecture3.pdf                                           │
//! ├─ Progress ──────────────────────────────────────────────────────┤
//! │ ✓ Uploading → ● Processing → ○ Fetching → ○ Done                 │
//! │ Processing: Extracting text... (checked 3 times)                 │
//! ├─ Your Summary ──────────────────────────────────────────────────┤
//! │ │ [Scrollable summary text]                                      │
//! └─────────────────────────────────────────────────────────────────┘
//!  [Ctrl+G] Generate | [Ctrl+Y] Copy | [Ctrl+S] Save | [Ctrl+Q] Quit
//! ```
//!
//! Dropping a file onto the terminal pastes its path; bracketed paste turns
//! that into a drop on the file selector.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, AppEvent, Focus, View};
pub use event::{AppAction, EventHandler};

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(config: crate::config::Config) -> anyhow::Result<()> {
    info!("Starting TUI mode");

    let mut terminal = init_terminal()?;
    let mut app = App::new(config);
    let mut events = EventHandler::new(std::time::Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
) -> anyhow::Result<()> {
    loop {
        let size = terminal.size()?;
        app.calculate_scroll_bounds(size.width, size.height);

        terminal.draw(|frame| ui::render(frame, app))?;

        // Progress from workflow and auth tasks
        app.poll_events();

        let Some(action) = events.next().await else {
            break;
        };

        match action {
            AppAction::Quit => {
                if app.confirm_quit() {
                    break;
                }
            }
            AppAction::ForceQuit => {
                app.confirm_quit();
                break;
            }
            _ => app.handle_action(action).await,
        }

        if app.should_quit {
            break;
        }
    }

    info!("TUI exited normally");
    Ok(())
}
