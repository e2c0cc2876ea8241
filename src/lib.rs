// NotePilot - turn lecture PDFs into study notes from the terminal

pub mod config;
pub mod models;
pub mod types;
pub mod selector;
pub mod backend;   // HTTP adapters for the summarization service
pub mod workflow;  // Upload -> poll -> download orchestration
pub mod presentation;
pub mod auth;
pub mod utils;
pub mod tui;       // Terminal User Interface

// Re-exports for convenience
pub use config::Config;
pub use types::{AppError, AppResult};
pub use workflow::{SummaryWorkflow, WorkflowSlot};
