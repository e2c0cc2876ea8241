//! Presentation Surface
//!
//! Everything that puts a summary in front of the user. The workflow only
//! emits data; a [`SummaryView`] decides how stages, notices and the final
//! text look. The CLI uses [`ConsoleView`], the TUI implements the trait on
//! its `App`.

pub mod console;
pub mod export;

pub use console::ConsoleView;
pub use export::{copy_summary, export_path, save_summary, ClipboardSink, SystemClipboard, DEFAULT_EXPORT_NAME};

use crate::models::SummaryArtifact;
use crate::types::Notice;
use crate::workflow::{WorkflowEvent, WorkflowStage};

pub trait SummaryView {
    fn show_stage(&mut self, stage: &WorkflowStage);

    fn show_summary(&mut self, artifact: &SummaryArtifact);

    fn notify(&mut self, notice: &Notice);

    /// Route one workflow event to the matching method.
    fn apply_event(&mut self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::StageChanged(stage) => self.show_stage(stage),
            WorkflowEvent::Finished(artifact) => self.show_summary(artifact),
            WorkflowEvent::Failed(message) => self.notify(&Notice::error(message.clone())),
        }
    }
}

/// Backend step names arrive as `snake_case`.
pub fn humanize_step(step: &str) -> String {
    let mut text = step.replace('_', " ");
    if let Some(first) = text.get(0..1) {
        let upper = first.to_uppercase();
        text.replace_range(0..1, &upper);
    }
    text
}

/// One-line description of a stage.
pub fn stage_label(stage: &WorkflowStage) -> String {
    match stage {
        WorkflowStage::Idle => "Ready".to_string(),
        WorkflowStage::Uploading { file_name } => format!("Uploading {}...", file_name),
        WorkflowStage::Processing { step: Some(step), .. } => {
            format!("Processing: {}...", humanize_step(step))
        }
        WorkflowStage::Processing { step: None, .. } => "Processing...".to_string(),
        WorkflowStage::Downloading { .. } => "Fetching summary...".to_string(),
        WorkflowStage::Complete => "Summary ready".to_string(),
        WorkflowStage::Failed(message) => message.clone(),
        WorkflowStage::Cancelled => "Cancelled".to_string(),
    }
}
