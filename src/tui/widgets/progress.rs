//! Progress Widget
//!
//! Displays where the current upload is in the workflow.

use crate::presentation::stage_label;
use crate::tui::theme::{Icons, Theme};
use crate::workflow::WorkflowStage;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the progress indicator
pub fn render_progress(frame: &mut Frame, area: Rect, stage: &WorkflowStage) {
    let block = Block::default()
        .title(" Progress ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let detail_style = match stage {
        WorkflowStage::Failed(_) => Theme::error(),
        WorkflowStage::Complete => Theme::complete(),
        WorkflowStage::Idle | WorkflowStage::Cancelled => Theme::text_dim(),
        _ => Theme::active(),
    };

    let mut detail = stage_label(stage);
    if let WorkflowStage::Processing { polls, .. } = stage {
        if *polls > 0 {
            detail.push_str(&format!(" (checked {} times)", polls));
        }
    }

    let lines = vec![
        Line::from(build_progress_line(stage)),
        Line::from(Span::styled(
            truncate_string(&detail, inner.width as usize),
            detail_style,
        )),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Build the progress line with stage indicators
fn build_progress_line(stage: &WorkflowStage) -> Vec<Span<'static>> {
    let position = StagePosition::of(stage);
    let names = ["Uploading", "Processing", "Fetching", "Done"];

    let mut spans = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let (icon, style) = icon_for(position.state_of(i));
        spans.push(Span::styled(format!("{} ", icon), style));
        spans.push(Span::styled(name.to_string(), style));

        if i < names.len() - 1 {
            spans.push(Span::styled(format!(" {} ", Icons::ARROW), Theme::text_dim()));
        }
    }

    spans
}

fn icon_for(state: StageState) -> (&'static str, Style) {
    match state {
        StageState::Complete => (Icons::COMPLETE, Theme::complete()),
        StageState::Active => (Icons::ACTIVE, Theme::active()),
        StageState::Pending => (Icons::PENDING, Theme::pending()),
        StageState::Error => (Icons::ERROR, Theme::error()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StageState {
    Pending,
    Active,
    Complete,
    Error,
}

/// Index of the active step, and whether the run stopped there.
#[derive(Debug, Clone, Copy, PartialEq)]
enum StagePosition {
    NotStarted,
    At(usize),
    Finished,
    Stopped,
}

impl StagePosition {
    fn of(stage: &WorkflowStage) -> Self {
        match stage {
            WorkflowStage::Idle => StagePosition::NotStarted,
            WorkflowStage::Uploading { .. } => StagePosition::At(0),
            WorkflowStage::Processing { .. } => StagePosition::At(1),
            WorkflowStage::Downloading { .. } => StagePosition::At(2),
            WorkflowStage::Complete => StagePosition::Finished,
            WorkflowStage::Failed(_) | WorkflowStage::Cancelled => StagePosition::Stopped,
        }
    }

    fn state_of(&self, index: usize) -> StageState {
        match *self {
            StagePosition::NotStarted => StageState::Pending,
            StagePosition::Finished => StageState::Complete,
            StagePosition::Stopped => StageState::Error,
            StagePosition::At(active) if index < active => StageState::Complete,
            StagePosition::At(active) if index == active => StageState::Active,
            StagePosition::At(_) => StageState::Pending,
        }
    }
}

/// Truncate a string to fit within a given width
fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max_width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_marks_upload_complete() {
        let position = StagePosition::of(&WorkflowStage::Processing {
            session_id: "abc".to_string(),
            polls: 3,
            step: None,
        });
        assert_eq!(position.state_of(0), StageState::Complete);
        assert_eq!(position.state_of(1), StageState::Active);
        assert_eq!(position.state_of(3), StageState::Pending);
    }

    #[test]
    fn test_truncate_string_counts_chars() {
        assert_eq!(truncate_string("résumé.pdf", 20), "résumé.pdf");
        assert_eq!(truncate_string("résumé.pdf", 6), "rés...");
    }
}
