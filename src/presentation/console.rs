// Line-oriented view used by the `summarize` command

use crate::models::SummaryArtifact;
use crate::presentation::{stage_label, SummaryView};
use crate::types::{Notice, Severity};
use crate::workflow::WorkflowStage;
use std::io::Write;

pub struct ConsoleView<W: Write> {
    out: W,
    last_line: Option<String>,
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self { out, last_line: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        writeln!(self.out, "{}", text).ok();
        self.out.flush().ok();
    }
}

impl<W: Write> SummaryView for ConsoleView<W> {
    fn show_stage(&mut self, stage: &WorkflowStage) {
        // Polls repeat the same stage every interval
        let label = stage_label(stage);
        if self.last_line.as_deref() == Some(label.as_str()) {
            return;
        }
        if matches!(stage, WorkflowStage::Failed(_) | WorkflowStage::Complete) {
            self.last_line = Some(label);
            return;
        }
        self.line(&format!("==> {}", label));
        self.last_line = Some(label);
    }

    fn show_summary(&mut self, artifact: &SummaryArtifact) {
        self.line("");
        self.line("Your Summary");
        self.line("------------");
        let text = artifact.text.trim_end().to_string();
        self.line(&text);
        self.line("");
    }

    fn notify(&mut self, notice: &Notice) {
        let prefix = match notice.severity {
            Severity::Info => "",
            Severity::Success => "✓ ",
            Severity::Error => "error: ",
        };
        self.line(&format!("{}{}", prefix, notice.message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::WorkflowEvent;

    fn output(view: ConsoleView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn repeated_stages_are_printed_once() {
        let mut view = ConsoleView::new(Vec::new());
        let stage = WorkflowStage::Processing {
            session_id: "abc".to_string(),
            polls: 1,
            step: Some("converting_pdf".to_string()),
        };
        view.show_stage(&stage);
        view.show_stage(&WorkflowStage::Processing {
            session_id: "abc".to_string(),
            polls: 2,
            step: Some("converting_pdf".to_string()),
        });

        assert_eq!(output(view), "==> Processing: Converting pdf...\n");
    }

    #[test]
    fn summary_and_errors_are_written() {
        let mut view = ConsoleView::new(Vec::new());
        view.apply_event(&WorkflowEvent::Finished(SummaryArtifact::new(
            Some("abc".to_string()),
            "- point one\n",
        )));
        view.apply_event(&WorkflowEvent::Failed("Something went wrong.".to_string()));

        let text = output(view);
        assert!(text.contains("Your Summary\n------------\n- point one\n"));
        assert!(text.ends_with("error: Something went wrong.\n"));
    }
}
