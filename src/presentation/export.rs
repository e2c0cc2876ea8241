// Copy and save actions for a finished summary

use crate::models::SummaryArtifact;
use crate::types::{AppError, AppResult, Notice};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name the backend uses for downloads.
pub const DEFAULT_EXPORT_NAME: &str = "StudyMaterial.txt";

/// Anything that can receive text on a clipboard.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> AppResult<()>;
}

pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> AppResult<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| AppError::Internal(format!("Clipboard unavailable: {}", e)))?;
        Ok(Self { inner })
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> AppResult<()> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| AppError::Internal(format!("Clipboard write failed: {}", e)))
    }
}

pub fn copy_summary(sink: &mut dyn ClipboardSink, artifact: &SummaryArtifact) -> AppResult<Notice> {
    sink.set_text(&artifact.text)?;
    info!(lines = artifact.line_count(), "Summary copied to clipboard");
    Ok(Notice::success("Summary copied to clipboard"))
}

/// Where a save should land. A missing target or a directory gets the
/// default file name appended.
pub fn export_path(target: Option<&Path>, default_dir: &Path) -> PathBuf {
    match target {
        None => default_dir.join(DEFAULT_EXPORT_NAME),
        Some(path) if path.is_dir() || path.as_os_str().to_string_lossy().ends_with('/') => {
            path.join(DEFAULT_EXPORT_NAME)
        }
        Some(path) => path.to_path_buf(),
    }
}

/// Write the summary text to disk and return the path written.
pub async fn save_summary(
    artifact: &SummaryArtifact,
    target: Option<&Path>,
    default_dir: &Path,
) -> AppResult<PathBuf> {
    let path = export_path(target, default_dir);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, artifact.text.as_bytes()).await?;
    info!(path = %path.display(), "Summary saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Default)]
    struct MemoryClipboard {
        contents: Option<String>,
    }

    impl ClipboardSink for MemoryClipboard {
        fn set_text(&mut self, text: &str) -> AppResult<()> {
            self.contents = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_copy_puts_text_on_clipboard() {
        let mut clipboard = MemoryClipboard::default();
        let artifact = SummaryArtifact::new(None, "Key terms");
        let notice = copy_summary(&mut clipboard, &artifact).unwrap();

        assert_eq!(clipboard.contents.as_deref(), Some("Key terms"));
        assert!(!notice.is_error());
    }

    #[test]
    fn test_export_path_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            export_path(None, dir.path()),
            dir.path().join("StudyMaterial.txt")
        );
        assert_eq!(
            export_path(Some(dir.path()), Path::new(".")),
            dir.path().join("StudyMaterial.txt")
        );
        let explicit = dir.path().join("bio.txt");
        assert_eq!(export_path(Some(&explicit), Path::new(".")), explicit);
    }

    #[tokio::test]
    async fn test_save_writes_text_and_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("exports").join("week1");
        let artifact = SummaryArtifact::new(Some("abc".to_string()), "# Cells\n- nucleus\n");

        let path = save_summary(&artifact, None, &out_dir).await.unwrap();

        assert_eq!(path, out_dir.join(DEFAULT_EXPORT_NAME));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Cells\n- nucleus\n");
    }
}
