// Error and notice types shared by the workflow, the auth gate and the views

use chrono::{DateTime, Utc};

/// Generic message shown when a request to the backend fails.
pub const GENERIC_FAILURE: &str = "Something went wrong.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Wrong file type, missing file, empty credentials. Recovered locally.
    #[error("{0}")]
    Validation(String),

    /// Connection failure or non-2xx response at any stage of the workflow.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend finished the job with `status: "error"`.
    #[error("Processing failed: {0}")]
    BackendReported(String),

    #[error("Workflow cancelled")]
    Cancelled,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl AppError {
    /// Text the user sees for this error. Network detail stays in the log.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Network(_) => GENERIC_FAILURE.to_string(),
            AppError::BackendReported(msg) => format!("Processing failed: {}", msg),
            AppError::Cancelled => "Summary generation cancelled".to_string(),
            other => other.to_string(),
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A non-blocking, user-visible message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn from_error(err: &AppError) -> Self {
        match err {
            AppError::Cancelled => Self::info(err.user_message()),
            _ => Self::error(err.user_message()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
