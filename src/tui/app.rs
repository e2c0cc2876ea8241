//! Application State
//!
//! Contains the main application state and logic for the TUI.

use crate::auth::{AuthAction, AuthGate, AuthOutcome, AuthSession, Credentials, FirebaseIdentity};
use crate::backend::{create_backend, SummaryBackend};
use crate::config::Config;
use crate::models::SummaryArtifact;
use crate::presentation::{copy_summary, save_summary, ClipboardSink, SummaryView, SystemClipboard};
use crate::selector::FileSelector;
use crate::tui::event::AppAction;
use crate::types::{AppError, Notice};
use crate::workflow::{SummaryWorkflow, WorkflowEvent, WorkflowSlot, WorkflowStage, WorkflowUpdate};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tui_textarea::TextArea;

/// How long a notice stays on screen.
pub const NOTICE_TTL_SECS: i64 = 5;

/// Rows taken by everything except the summary pane.
const FIXED_ROWS: u16 = 14;

/// Current view/screen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    Main,
    Auth,
    Help,
}

/// Which pane receives keys on the main view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    FilePath,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthField {
    #[default]
    Email,
    Password,
}

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    Workflow(WorkflowUpdate),
    Auth(AuthOutcome),
}

pub struct AuthForm {
    pub email: TextArea<'static>,
    pub password: TextArea<'static>,
    pub field: AuthField,
    pub pending: bool,
}

impl AuthForm {
    fn new() -> Self {
        let mut email = TextArea::default();
        email.set_cursor_line_style(ratatui::style::Style::default());
        email.set_placeholder_text("Email address");

        let mut password = TextArea::default();
        password.set_cursor_line_style(ratatui::style::Style::default());
        password.set_placeholder_text("Password");
        password.set_mask_char('•');

        Self {
            email,
            password,
            field: AuthField::Email,
            pending: false,
        }
    }

    fn active(&mut self) -> &mut TextArea<'static> {
        match self.field {
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    fn credentials(&self) -> Credentials {
        Credentials::new(self.email.lines().join(""), self.password.lines().join(""))
    }

    fn toggle_field(&mut self) {
        self.field = match self.field {
            AuthField::Email => AuthField::Password,
            AuthField::Password => AuthField::Email,
        };
    }
}

/// Main application state
pub struct App {
    pub config: Config,

    // UI State
    pub view: View,
    pub focus: Focus,
    pub should_quit: bool,

    // Upload State
    pub selector: FileSelector,
    pub path_input: TextArea<'static>,

    // Workflow State
    pub stage: WorkflowStage,
    pub summary: Option<SummaryArtifact>,
    pub scroll_offset: u16,
    pub max_scroll: u16,
    pub notices: Vec<Notice>,
    slot: WorkflowSlot,
    backend: Option<Arc<dyn SummaryBackend>>,

    // Auth State
    pub auth_form: AuthForm,
    pub session: Option<AuthSession>,
    auth: Option<AuthGate>,

    clipboard: Option<Box<dyn ClipboardSink>>,

    // Async communication
    event_rx: mpsc::Receiver<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        let (tx, rx) = mpsc::channel(100);

        let mut notices = Vec::new();
        let backend = match create_backend(&config.backend) {
            Ok(backend) => Some(backend),
            Err(e) => {
                error!("Failed to create backend client: {}", e);
                notices.push(Notice::from_error(&e));
                None
            }
        };

        let auth = FirebaseIdentity::from_config(&config.identity)
            .map(|provider| AuthGate::new(Arc::new(provider)));

        Self {
            config,
            view: View::Main,
            focus: Focus::FilePath,
            should_quit: false,
            selector: FileSelector::new(),
            path_input: Self::new_path_input(),
            stage: WorkflowStage::Idle,
            summary: None,
            scroll_offset: 0,
            max_scroll: 0,
            notices,
            slot: WorkflowSlot::new(),
            backend,
            auth_form: AuthForm::new(),
            session: None,
            auth,
            clipboard: None,
            event_rx: rx,
            event_tx: tx,
        }
    }

    /// Replace the backend, mainly for driving the app against a stub.
    pub fn with_backend(mut self, backend: Arc<dyn SummaryBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    fn new_path_input() -> TextArea<'static> {
        let mut input = TextArea::default();
        input.set_cursor_line_style(ratatui::style::Style::default());
        input.set_placeholder_text("Type a path to a PDF and press Enter, or drop a file here");
        input
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth.is_some()
    }

    pub fn is_generating(&self) -> bool {
        self.slot.is_active()
    }

    /// Notices younger than [`NOTICE_TTL_SECS`].
    pub fn visible_notices(&self) -> impl Iterator<Item = &Notice> {
        let cutoff = Utc::now() - chrono::Duration::seconds(NOTICE_TTL_SECS);
        self.notices.iter().filter(move |n| n.at > cutoff)
    }

    /// Check if we should confirm quit
    pub fn confirm_quit(&mut self) -> bool {
        if self.slot.cancel() {
            info!("Cancelled running workflow on quit");
        }
        true
    }

    /// Poll for async events
    pub fn poll_events(&mut self) {
        let mut collected = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            collected.push(event);
        }

        for event in collected {
            self.handle_event(event);
        }
    }

    /// Handle an async event
    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Workflow(update) => self.handle_workflow_update(update),
            AppEvent::Auth(outcome) => {
                self.auth_form.pending = false;
                if let Some(session) = outcome.session.clone() {
                    self.session = Some(session);
                    self.view = View::Main;
                }
                self.notify(&outcome.notice);
            }
        }
    }

    fn handle_workflow_update(&mut self, update: WorkflowUpdate) {
        if !self.slot.is_current(update.run_id) {
            debug!(run_id = update.run_id, "Ignoring update from stale run");
            return;
        }

        let ended = matches!(
            update.event,
            WorkflowEvent::Finished(_)
                | WorkflowEvent::Failed(_)
                | WorkflowEvent::StageChanged(WorkflowStage::Cancelled)
        );

        self.apply_event(&update.event);

        if ended {
            self.slot.finish(update.run_id);
        }
    }

    /// Handle a user action
    pub async fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Quit | AppAction::ForceQuit => {
                self.should_quit = true;
            }
            AppAction::Submit => match self.view {
                View::Auth => self.submit_auth(AuthAction::LogIn),
                View::Main if self.focus == Focus::FilePath => self.stage_typed_path(),
                _ => {}
            },
            AppAction::SignUp => {
                if self.view == View::Auth {
                    self.submit_auth(AuthAction::SignUp);
                }
            }
            AppAction::Generate => self.generate(),
            AppAction::Copy => self.copy(),
            AppAction::Save => self.save().await,
            AppAction::ToggleAuth => {
                self.view = if self.view == View::Auth {
                    View::Main
                } else {
                    View::Auth
                };
            }
            AppAction::ToggleHelp => {
                self.view = if self.view == View::Help {
                    View::Main
                } else {
                    View::Help
                };
            }
            AppAction::Escape => {
                if self.view != View::Main {
                    self.view = View::Main;
                } else {
                    self.cancel();
                }
            }
            AppAction::NextField => match self.view {
                View::Auth => self.auth_form.toggle_field(),
                _ => {
                    self.focus = match self.focus {
                        Focus::FilePath => Focus::Summary,
                        Focus::Summary => Focus::FilePath,
                    };
                }
            },
            AppAction::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            AppAction::ScrollDown => {
                if self.scroll_offset < self.max_scroll {
                    self.scroll_offset += 1;
                }
            }
            AppAction::ScrollPageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
            }
            AppAction::ScrollPageDown => {
                self.scroll_offset = (self.scroll_offset + 10).min(self.max_scroll);
            }
            AppAction::Paste(text) => self.handle_paste(&text),
            AppAction::Input(key_event) => {
                self.handle_input(key_event);
            }
            AppAction::Tick => {
                let cutoff = Utc::now() - chrono::Duration::seconds(NOTICE_TTL_SECS);
                self.notices.retain(|n| n.at > cutoff);
            }
        }
    }

    /// Handle keyboard input
    fn handle_input(&mut self, key: crossterm::event::KeyEvent) {
        match self.view {
            View::Auth => {
                if !self.auth_form.pending {
                    self.auth_form.active().input(key);
                }
            }
            View::Main if self.focus == Focus::FilePath => {
                self.path_input.input(key);
            }
            View::Help => {
                self.view = View::Main;
            }
            _ => {}
        }
    }

    /// A paste on the main view is treated as a dropped file.
    fn handle_paste(&mut self, text: &str) {
        match self.view {
            View::Auth => {
                self.auth_form.active().insert_str(text.trim());
            }
            View::Main => {
                if self.selector.drop_file(text).is_ok() {
                    self.path_input = Self::new_path_input();
                }
            }
            View::Help => {}
        }
    }

    fn stage_typed_path(&mut self) {
        let typed = self.path_input.lines().join("");
        let typed = typed.trim();
        if typed.is_empty() {
            return;
        }
        if self.selector.browse(typed).is_ok() {
            self.path_input = Self::new_path_input();
        }
    }

    /// Start a workflow for the staged file, replacing any run in flight.
    fn generate(&mut self) {
        let Some(backend) = self.backend.clone() else {
            self.notify(&Notice::error("Backend client is not available"));
            return;
        };

        let file = match self.selector.require_staged() {
            Ok(file) => file,
            Err(_) => return,
        };

        let ticket = self.slot.begin();
        info!(run_id = ticket.run_id, file = %file.name, "Starting summary workflow");

        self.summary = None;
        self.scroll_offset = 0;
        self.stage = WorkflowStage::Uploading {
            file_name: file.name.clone(),
        };

        let (update_tx, mut update_rx) = mpsc::channel(32);
        let workflow = SummaryWorkflow::from_config(backend, &self.config.backend).with_events(update_tx);

        tokio::spawn(async move {
            workflow.run(&file, &ticket).await.ok();
        });

        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            while let Some(update) = update_rx.recv().await {
                if tx.send(AppEvent::Workflow(update)).await.is_err() {
                    break;
                }
            }
        });
    }

    fn cancel(&mut self) {
        if self.slot.cancel() {
            self.stage = WorkflowStage::Cancelled;
            self.notify(&Notice::from_error(&AppError::Cancelled));
        }
    }

    fn copy(&mut self) {
        let Some(artifact) = self.summary.clone() else {
            self.notify(&Notice::error("No summary to copy yet"));
            return;
        };

        if self.clipboard.is_none() {
            match SystemClipboard::new() {
                Ok(clipboard) => self.clipboard = Some(Box::new(clipboard)),
                Err(e) => {
                    warn!("{}", e);
                    self.notify(&Notice::from_error(&e));
                    return;
                }
            }
        }

        let result = match self.clipboard.as_deref_mut() {
            Some(sink) => copy_summary(sink, &artifact),
            None => return,
        };
        match result {
            Ok(notice) => self.notify(&notice),
            Err(e) => self.notify(&Notice::from_error(&e)),
        }
    }

    async fn save(&mut self) {
        let Some(artifact) = self.summary.clone() else {
            self.notify(&Notice::error("No summary to save yet"));
            return;
        };

        match save_summary(&artifact, None, &self.config.output.save_dir).await {
            Ok(path) => self.notify(&Notice::success(format!("Saved to {}", path.display()))),
            Err(e) => {
                error!("Failed to save summary: {}", e);
                self.notify(&Notice::from_error(&e));
            }
        }
    }

    fn submit_auth(&mut self, action: AuthAction) {
        if self.auth_form.pending {
            return;
        }
        let Some(gate) = self.auth.clone() else {
            self.notify(&Notice::error("Sign-in is not configured (set FIREBASE_API_KEY)"));
            return;
        };

        let credentials = self.auth_form.credentials();
        if let Err(e) = credentials.validate() {
            self.notify(&Notice::from_error(&e));
            return;
        }

        self.auth_form.pending = true;
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = gate.attempt(action, &credentials).await;
            tx.send(AppEvent::Auth(outcome)).await.ok();
        });
    }

    /// Update scroll bounds from the terminal size before drawing
    pub fn calculate_scroll_bounds(&mut self, width: u16, height: u16) {
        let viewport = height.saturating_sub(FIXED_ROWS + 2);
        let content = self
            .summary
            .as_ref()
            .map(|s| wrapped_height(&s.text, width.saturating_sub(4)))
            .unwrap_or(0);
        self.update_scroll_bounds(content, viewport);
    }

    /// Update max scroll based on content
    pub fn update_scroll_bounds(&mut self, content_height: u16, viewport_height: u16) {
        self.max_scroll = content_height.saturating_sub(viewport_height);
        if self.scroll_offset > self.max_scroll {
            self.scroll_offset = self.max_scroll;
        }
    }
}

impl SummaryView for App {
    fn show_stage(&mut self, stage: &WorkflowStage) {
        self.stage = stage.clone();
    }

    /// Focus the summary pane and scroll it to the top.
    fn show_summary(&mut self, artifact: &SummaryArtifact) {
        self.summary = Some(artifact.clone());
        self.focus = Focus::Summary;
        self.scroll_offset = 0;
        self.notify(&Notice::success("Summary ready"));
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
        if self.notices.len() > 20 {
            self.notices.remove(0);
        }
    }
}

/// Number of rows `text` occupies when wrapped at `width` columns.
pub fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let rows: usize = text
        .lines()
        .map(|line| line.chars().count().div_ceil(width).max(1))
        .sum();
    rows.min(u16::MAX as usize) as u16
}
