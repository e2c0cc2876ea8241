// Core models for the upload -> poll -> download workflow

use crate::types::{AppError, AppResult};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const PDF_MIME: &str = "application/pdf";

/// A file the user picked or dropped, validated by the selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

impl SelectedFile {
    pub fn is_pdf(&self) -> bool {
        self.mime_type
            .parse::<mime::Mime>()
            .is_ok_and(|m| m.essence_str() == mime::APPLICATION_PDF.essence_str())
    }

    pub fn size_mib(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }

    /// Size in MiB rounded to two decimals, e.g. `"1.50 MB"`.
    pub fn display_size(&self) -> String {
        format!("{:.2} MB", self.size_mib())
    }
}

/// Which summary style the backend should produce (`format` form field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryFormat {
    /// Quick-reference sheet with key formulas and bullet points
    #[default]
    CheatSheet,
    /// Long-form notes with explanations and examples
    DetailedNotes,
}

impl SummaryFormat {
    pub fn as_param(&self) -> &'static str {
        match self {
            SummaryFormat::CheatSheet => "1",
            SummaryFormat::DetailedNotes => "2",
        }
    }
}

impl fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryFormat::CheatSheet => write!(f, "cheat-sheet"),
            SummaryFormat::DetailedNotes => write!(f, "detailed"),
        }
    }
}

impl FromStr for SummaryFormat {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "1" | "cheat-sheet" | "cheatsheet" => Ok(SummaryFormat::CheatSheet),
            "2" | "detailed" | "detailed-notes" => Ok(SummaryFormat::DetailedNotes),
            other => Err(AppError::Config(format!("Unknown summary format: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Completed,
    Error,
}

impl JobStatus {
    /// Anything that is not a terminal status counts as still pending.
    pub fn from_wire(status: &str) -> Self {
        match status {
            "completed" => JobStatus::Completed,
            "error" => JobStatus::Error,
            _ => JobStatus::Pending,
        }
    }
}

/// Body of `GET /status/{session_id}`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct StatusReport {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub step: Option<String>,
}

impl StatusReport {
    pub fn job_status(&self) -> JobStatus {
        JobStatus::from_wire(&self.status)
    }

    pub fn pending() -> Self {
        Self {
            status: "pending".to_string(),
            message: None,
            step: None,
        }
    }

    pub fn completed() -> Self {
        Self {
            status: "completed".to_string(),
            message: None,
            step: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            step: None,
        }
    }
}

/// Server-side job tracked while polling.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadJob {
    pub session_id: String,
    pub status: JobStatus,
    pub message: Option<String>,
    pub step: Option<String>,
    pub polls: u32,
}

impl UploadJob {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            status: JobStatus::Pending,
            message: None,
            step: None,
            polls: 0,
        }
    }

    /// Fold one poll response into the job.
    pub fn apply(&mut self, report: &StatusReport) {
        self.polls += 1;
        self.status = report.job_status();
        self.message = report.message.clone();
        if report.step.is_some() {
            self.step = report.step.clone();
        }
    }
}

/// The finished summary text.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryArtifact {
    pub session_id: Option<String>,
    pub text: String,
    pub fetched_at: DateTime<Utc>,
}

impl SummaryArtifact {
    pub fn new(session_id: Option<String>, text: impl Into<String>) -> Self {
        Self {
            session_id,
            text: text.into(),
            fetched_at: Utc::now(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

/// What the backend answered to an upload.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Job accepted; poll with this session id.
    Session(String),
    /// The backend produced the summary in the same response.
    Immediate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_size_rounds_to_two_decimals() {
        let file = SelectedFile {
            path: PathBuf::from("/tmp/lecture.pdf"),
            name: "lecture.pdf".to_string(),
            size_bytes: 1_572_864,
            mime_type: PDF_MIME.to_string(),
        };
        assert_eq!(file.display_size(), "1.50 MB");
        assert!(file.is_pdf());

        let tiny = SelectedFile { size_bytes: 1234, ..file };
        assert_eq!(tiny.display_size(), "0.00 MB");
    }

    #[test]
    fn test_unknown_status_stays_pending() {
        assert_eq!(JobStatus::from_wire("completed"), JobStatus::Completed);
        assert_eq!(JobStatus::from_wire("error"), JobStatus::Error);
        assert_eq!(JobStatus::from_wire("processing"), JobStatus::Pending);
        assert_eq!(JobStatus::from_wire("not_found"), JobStatus::Pending);
    }

    #[test]
    fn test_status_report_parses_optional_fields() {
        let report: StatusReport =
            serde_json::from_str(r#"{"status": "processing", "step": "extracting_text"}"#).unwrap();
        assert_eq!(report.job_status(), JobStatus::Pending);
        assert_eq!(report.step.as_deref(), Some("extracting_text"));
        assert!(report.message.is_none());

        let report: StatusReport =
            serde_json::from_str(r#"{"status": "error", "message": "file too large"}"#).unwrap();
        assert_eq!(report.job_status(), JobStatus::Error);
        assert_eq!(report.message.as_deref(), Some("file too large"));
    }

    #[test]
    fn test_job_keeps_last_known_step() {
        let mut job = UploadJob::new("abc");
        job.apply(&StatusReport {
            status: "processing".to_string(),
            message: None,
            step: Some("converting_pdf".to_string()),
        });
        job.apply(&StatusReport::pending());
        assert_eq!(job.polls, 2);
        assert_eq!(job.step.as_deref(), Some("converting_pdf"));
        assert_eq!(job.status, JobStatus::Pending);

        job.apply(&StatusReport::completed());
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[test]
    fn test_summary_format_params() {
        assert_eq!(SummaryFormat::default().as_param(), "1");
        assert_eq!("2".parse::<SummaryFormat>().unwrap(), SummaryFormat::DetailedNotes);
        assert_eq!("cheat-sheet".parse::<SummaryFormat>().unwrap(), SummaryFormat::CheatSheet);
        assert!("3".parse::<SummaryFormat>().is_err());
    }
}
