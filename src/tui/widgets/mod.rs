//! TUI Widgets
//!
//! Custom widgets for the NotePilot TUI.

mod auth;
mod progress;

pub use auth::render_auth;
pub use progress::render_progress;
