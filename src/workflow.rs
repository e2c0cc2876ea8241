//! Summary Workflow
//!
//! Drives one upload-to-summary attempt:
//!
//! ```text
//! FileSelector ──► submit ──► poll /status every interval ──► download ──► SummaryArtifact
//!                    │              │  pending → wait             │
//!                    │              │  error   → BackendReported  │
//!                    └── Immediate ─┴──────────────────────────────┘
//! ```
//!
//! Every run is tied to a [`WorkflowTicket`]. The ticket's cancellation token
//! is checked before each poll, raced against every in-flight request, and
//! checked again before a response is applied, so a cancelled run never
//! touches state after the fact. [`WorkflowSlot`] cancels the previous ticket
//! whenever a new run begins.

use crate::backend::{PdfUpload, SummaryBackend};
use crate::config::BackendConfig;
use crate::models::{JobStatus, SelectedFile, StatusReport, Submission, SummaryArtifact, SummaryFormat, UploadJob};
use crate::selector::FileSelector;
use crate::types::{AppError, AppResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Where a run currently is
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WorkflowStage {
    #[default]
    Idle,
    Uploading {
        file_name: String,
    },
    Processing {
        session_id: String,
        polls: u32,
        step: Option<String>,
    },
    Downloading {
        session_id: String,
    },
    Complete,
    Failed(String),
    Cancelled,
}

impl WorkflowStage {
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            WorkflowStage::Uploading { .. }
                | WorkflowStage::Processing { .. }
                | WorkflowStage::Downloading { .. }
        )
    }
}

/// Progress reported by a run
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    StageChanged(WorkflowStage),
    Finished(SummaryArtifact),
    Failed(String),
}

/// A progress event tagged with the run that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowUpdate {
    pub run_id: u64,
    pub event: WorkflowEvent,
}

/// Identity and cancellation handle of one run.
#[derive(Debug, Clone)]
pub struct WorkflowTicket {
    pub run_id: u64,
    pub token: CancellationToken,
}

impl WorkflowTicket {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Holds the ticket of the run currently in flight. At most one at a time.
#[derive(Debug, Default)]
pub struct WorkflowSlot {
    next_id: u64,
    current: Option<WorkflowTicket>,
}

impl WorkflowSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run, cancelling whatever was in flight.
    pub fn begin(&mut self) -> WorkflowTicket {
        if let Some(previous) = self.current.take() {
            if !previous.is_cancelled() {
                info!(run_id = previous.run_id, "Cancelling previous run");
                previous.cancel();
            }
        }
        self.next_id += 1;
        let ticket = WorkflowTicket {
            run_id: self.next_id,
            token: CancellationToken::new(),
        };
        self.current = Some(ticket.clone());
        ticket
    }

    /// Cancel the current run. Returns false when nothing was running.
    pub fn cancel(&mut self) -> bool {
        match self.current.take() {
            Some(ticket) if !ticket.is_cancelled() => {
                ticket.cancel();
                true
            }
            _ => false,
        }
    }

    /// Release the slot once `run_id` has ended on its own.
    pub fn finish(&mut self, run_id: u64) {
        if self.is_current(run_id) {
            self.current = None;
        }
    }

    pub fn is_current(&self, run_id: u64) -> bool {
        self.current.as_ref().map(|t| t.run_id) == Some(run_id)
    }

    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

pub struct SummaryWorkflow {
    backend: Arc<dyn SummaryBackend>,
    poll_interval: Duration,
    format: SummaryFormat,
    events: Option<mpsc::Sender<WorkflowUpdate>>,
}

impl SummaryWorkflow {
    pub fn new(backend: Arc<dyn SummaryBackend>, poll_interval: Duration) -> Self {
        Self {
            backend,
            poll_interval,
            format: SummaryFormat::default(),
            events: None,
        }
    }

    pub fn from_config(backend: Arc<dyn SummaryBackend>, config: &BackendConfig) -> Self {
        Self::new(backend, config.poll_interval).with_format(config.format)
    }

    pub fn with_format(mut self, format: SummaryFormat) -> Self {
        self.format = format;
        self
    }

    /// Send progress updates to `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<WorkflowUpdate>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Upload whatever the selector has staged. Nothing is sent when no
    /// valid PDF is staged.
    pub async fn start(
        &self,
        selector: &mut FileSelector,
        ticket: &WorkflowTicket,
    ) -> AppResult<SummaryArtifact> {
        let file = selector.require_staged()?;
        self.run(&file, ticket).await
    }

    /// Run the full workflow for `file` and report the outcome as an event.
    pub async fn run(&self, file: &SelectedFile, ticket: &WorkflowTicket) -> AppResult<SummaryArtifact> {
        let result = self.execute(file, ticket).await;

        match &result {
            Ok(artifact) => {
                self.emit(ticket, WorkflowEvent::StageChanged(WorkflowStage::Complete)).await;
                self.emit(ticket, WorkflowEvent::Finished(artifact.clone())).await;
            }
            Err(AppError::Cancelled) => {
                info!(run_id = ticket.run_id, "Workflow cancelled");
                self.emit(ticket, WorkflowEvent::StageChanged(WorkflowStage::Cancelled)).await;
            }
            Err(e) => {
                warn!(run_id = ticket.run_id, error = %e, "Workflow failed");
                let message = e.user_message();
                self.emit(ticket, WorkflowEvent::StageChanged(WorkflowStage::Failed(message.clone())))
                    .await;
                self.emit(ticket, WorkflowEvent::Failed(message)).await;
            }
        }

        result
    }

    async fn execute(&self, file: &SelectedFile, ticket: &WorkflowTicket) -> AppResult<SummaryArtifact> {
        if !file.is_pdf() {
            return Err(AppError::Validation("Please select a valid PDF file".to_string()));
        }

        let upload = PdfUpload::read(file).await?;
        self.emit(
            ticket,
            WorkflowEvent::StageChanged(WorkflowStage::Uploading {
                file_name: file.name.clone(),
            }),
        )
        .await;

        let submission = guarded(ticket, self.backend.submit(&upload, self.format)).await?;

        let session_id = match submission {
            Submission::Immediate(text) => return Ok(SummaryArtifact::new(None, text)),
            Submission::Session(id) => id,
        };

        let mut job = UploadJob::new(session_id);
        info!(run_id = ticket.run_id, session_id = %job.session_id, "Polling job status");
        self.emit(ticket, processing_stage(&job)).await;

        self.poll_until_terminal(&mut job, ticket).await?;

        self.emit(
            ticket,
            WorkflowEvent::StageChanged(WorkflowStage::Downloading {
                session_id: job.session_id.clone(),
            }),
        )
        .await;

        let text = guarded(ticket, self.backend.download(&job.session_id)).await?;
        Ok(SummaryArtifact::new(Some(job.session_id), text))
    }

    /// Poll once per interval until the job reaches a terminal status.
    async fn poll_until_terminal(&self, job: &mut UploadJob, ticket: &WorkflowTicket) -> AppResult<()> {
        loop {
            tokio::select! {
                biased;
                _ = ticket.token.cancelled() => return Err(AppError::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            let report: StatusReport = guarded(ticket, self.backend.status(&job.session_id)).await?;
            job.apply(&report);

            match job.status {
                JobStatus::Completed => {
                    info!(session_id = %job.session_id, polls = job.polls, "Job completed");
                    return Ok(());
                }
                JobStatus::Error => {
                    let message = job
                        .message
                        .clone()
                        .unwrap_or_else(|| "Unknown error".to_string());
                    return Err(AppError::BackendReported(message));
                }
                JobStatus::Pending => {
                    self.emit(ticket, processing_stage(job)).await;
                }
            }
        }
    }

    async fn emit(&self, ticket: &WorkflowTicket, event: WorkflowEvent) {
        if let Some(tx) = &self.events {
            tx.send(WorkflowUpdate {
                run_id: ticket.run_id,
                event,
            })
            .await
            .ok();
        }
    }
}

fn processing_stage(job: &UploadJob) -> WorkflowEvent {
    WorkflowEvent::StageChanged(WorkflowStage::Processing {
        session_id: job.session_id.clone(),
        polls: job.polls,
        step: job.step.clone(),
    })
}

/// Race `request` against cancellation, and drop its result if the ticket
/// was cancelled while it was in flight.
async fn guarded<T, F>(ticket: &WorkflowTicket, request: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    if ticket.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    let result = tokio::select! {
        biased;
        _ = ticket.token.cancelled() => return Err(AppError::Cancelled),
        result = request => result,
    };
    if ticket.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    result
}
