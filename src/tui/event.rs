//! Event Handling
//!
//! Handles keyboard, paste, and timer events for the TUI.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

/// Actions that can be performed in the application
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Quit the application (cancels a running workflow)
    Quit,
    /// Force quit without confirmation
    ForceQuit,
    /// Enter: stage the typed path, or log in on the auth view
    Submit,
    /// Sign up on the auth view
    SignUp,
    /// Upload the staged PDF and start polling
    Generate,
    /// Copy the summary to the clipboard
    Copy,
    /// Save the summary to disk
    Save,
    ToggleAuth,
    ToggleHelp,
    /// Escape - close modals, cancel the running workflow
    Escape,
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    /// Tab
    NextField,
    /// Bracketed paste; a file dragged onto the terminal arrives this way
    Paste(String),
    /// Regular input character
    Input(KeyEvent),
    /// Timer tick for notice expiry
    Tick,
}

/// Event handler for the TUI
pub struct EventHandler {
    rx: mpsc::Receiver<AppAction>,
    _tx: mpsc::Sender<AppAction>,
}

impl EventHandler {
    /// Create a new event handler with specified tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let tx_clone = tx.clone();

        tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                let tick = tick_interval.tick();
                let crossterm_event = reader.next().fuse();

                tokio::select! {
                    _ = tick => {
                        if tx_clone.send(AppAction::Tick).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(evt)) = crossterm_event => {
                        if let Some(action) = Self::map_event(evt) {
                            if tx_clone.send(action).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Wait for the next action
    pub async fn next(&mut self) -> Option<AppAction> {
        self.rx.recv().await
    }

    /// Map a crossterm event to an app action
    pub fn map_event(event: Event) -> Option<AppAction> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::map_key_event(key),
            Event::Paste(text) => Some(AppAction::Paste(text)),
            _ => None,
        }
    }

    /// Map a key event to an app action
    fn map_key_event(key: KeyEvent) -> Option<AppAction> {
        match (key.modifiers, key.code) {
            // Quit shortcuts
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(AppAction::ForceQuit),
            (KeyModifiers::CONTROL, KeyCode::Char('q')) => Some(AppAction::Quit),

            // Summary actions
            (KeyModifiers::CONTROL, KeyCode::Char('g')) => Some(AppAction::Generate),
            (KeyModifiers::CONTROL, KeyCode::Char('y')) => Some(AppAction::Copy),
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => Some(AppAction::Save),

            // Auth
            (KeyModifiers::CONTROL, KeyCode::Char('a')) => Some(AppAction::ToggleAuth),
            (KeyModifiers::CONTROL, KeyCode::Char('n')) => Some(AppAction::SignUp),

            (KeyModifiers::NONE, code) | (KeyModifiers::SHIFT, code) => match code {
                KeyCode::Esc => Some(AppAction::Escape),
                KeyCode::Enter => Some(AppAction::Submit),
                KeyCode::F(1) => Some(AppAction::ToggleHelp),

                // Scrolling
                KeyCode::Up => Some(AppAction::ScrollUp),
                KeyCode::Down => Some(AppAction::ScrollDown),
                KeyCode::PageUp => Some(AppAction::ScrollPageUp),
                KeyCode::PageDown => Some(AppAction::ScrollPageDown),

                KeyCode::Tab | KeyCode::BackTab => Some(AppAction::NextField),

                _ => Some(AppAction::Input(key)),
            },

            _ => Some(AppAction::Input(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(modifiers: KeyModifiers, code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(
            EventHandler::map_event(key(KeyModifiers::CONTROL, KeyCode::Char('g'))),
            Some(AppAction::Generate)
        );
        assert_eq!(
            EventHandler::map_event(key(KeyModifiers::CONTROL, KeyCode::Char('y'))),
            Some(AppAction::Copy)
        );
        assert_eq!(
            EventHandler::map_event(key(KeyModifiers::NONE, KeyCode::Esc)),
            Some(AppAction::Escape)
        );
    }

    #[test]
    fn test_paste_becomes_drop() {
        assert_eq!(
            EventHandler::map_event(Event::Paste("/tmp/notes.pdf".to_string())),
            Some(AppAction::Paste("/tmp/notes.pdf".to_string()))
        );
    }

    #[test]
    fn test_plain_characters_are_input() {
        let event = key(KeyModifiers::NONE, KeyCode::Char('x'));
        assert!(matches!(EventHandler::map_event(event), Some(AppAction::Input(_))));
    }
}
