//! File Selector
//!
//! Stages the PDF the user wants summarized. Files arrive either by browsing
//! (a typed path) or by dropping (terminals paste the path of a dragged file).
//! The MIME type is derived from the file name, the same way a browser fills
//! in `File.type`; anything other than `application/pdf` is rejected.

use crate::models::SelectedFile;
use crate::types::{AppError, AppResult, Notice};
use reqwest::Url;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How a file reached the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Browse,
    Drop,
}

impl SelectionSource {
    fn rejection_message(&self) -> &'static str {
        match self {
            SelectionSource::Browse => "Please select a valid PDF file",
            SelectionSource::Drop => "Please drop a valid PDF file",
        }
    }
}

#[derive(Debug, Default)]
pub struct FileSelector {
    staged: Option<SelectedFile>,
    status: Option<Notice>,
}

impl FileSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a file picked by path.
    pub fn browse(&mut self, path: impl AsRef<Path>) -> AppResult<&SelectedFile> {
        self.select(path.as_ref(), SelectionSource::Browse)
    }

    /// Stage a file dropped onto the terminal.
    pub fn drop_file(&mut self, raw: &str) -> AppResult<&SelectedFile> {
        let path = normalize_dropped_path(raw);
        self.select(&path, SelectionSource::Drop)
    }

    /// Validate and stage `path`. An invalid browse clears the staged file; an
    /// invalid drop leaves it in place.
    pub fn select(&mut self, path: &Path, source: SelectionSource) -> AppResult<&SelectedFile> {
        match inspect(path) {
            Ok(file) if file.is_pdf() => {
                info!(name = %file.name, size = file.size_bytes, "PDF staged for upload");
                self.status = Some(Notice::success(format!("Selected: {}", file.name)));
                Ok(self.staged.insert(file))
            }
            Ok(file) => {
                debug!(name = %file.name, mime = %file.mime_type, "Rejected non-PDF selection");
                Err(self.reject(source))
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Rejected unreadable selection");
                Err(self.reject(source))
            }
        }
    }

    fn reject(&mut self, source: SelectionSource) -> AppError {
        if source == SelectionSource::Browse {
            self.staged = None;
        }
        let message = source.rejection_message();
        self.status = Some(Notice::error(message));
        AppError::Validation(message.to_string())
    }

    pub fn staged(&self) -> Option<&SelectedFile> {
        self.staged.as_ref()
    }

    /// The file to upload, or a validation error when nothing is staged.
    pub fn require_staged(&mut self) -> AppResult<SelectedFile> {
        match &self.staged {
            Some(file) => Ok(file.clone()),
            None => {
                let message = "Please select a PDF file first";
                self.status = Some(Notice::error(message));
                Err(AppError::Validation(message.to_string()))
            }
        }
    }

    /// Last selection outcome, for display next to the file panel.
    pub fn status(&self) -> Option<&Notice> {
        self.status.as_ref()
    }

    pub fn clear(&mut self) {
        self.staged = None;
        self.status = None;
    }
}

/// Read metadata for `path` and guess its MIME type from the extension.
pub fn inspect(path: &Path) -> AppResult<SelectedFile> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(AppError::Validation(format!(
            "{} is not a regular file",
            path.display()
        )));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    Ok(SelectedFile {
        path: path.to_path_buf(),
        name,
        size_bytes: metadata.len(),
        mime_type,
    })
}

/// Terminals paste dropped files as a (possibly quoted or escaped) path,
/// sometimes as a percent-encoded `file://` URL.
fn normalize_dropped_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(trimmed);

    if unquoted.starts_with("file://") {
        if let Some(path) = Url::parse(unquoted).ok().and_then(|url| url.to_file_path().ok()) {
            return path;
        }
        return PathBuf::from(&unquoted["file://".len()..]);
    }
    PathBuf::from(unquoted.replace("\\ ", " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PDF_MIME;
    use crate::types::Severity;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_pdf_is_staged() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "lecture.pdf", b"%PDF-1.4 test");

        let mut selector = FileSelector::new();
        let file = selector.browse(&path).unwrap();
        assert_eq!(file.name, "lecture.pdf");
        assert_eq!(file.mime_type, PDF_MIME);
        assert_eq!(file.size_bytes, 13);

        let status = selector.status().unwrap();
        assert_eq!(status.message, "Selected: lecture.pdf");
        assert_eq!(status.severity, Severity::Success);
    }

    #[test]
    fn test_non_pdf_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut selector = FileSelector::new();

        for name in ["notes.txt", "slides.pptx", "scan.png", "README"] {
            let path = write_file(&dir, name, b"not a pdf");
            let err = selector.browse(&path).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
            assert!(selector.staged().is_none());
        }
        assert_eq!(selector.status().unwrap().message, "Please select a valid PDF file");
        assert!(selector.require_staged().is_err());
    }

    #[test]
    fn test_invalid_browse_clears_staged_file() {
        let dir = TempDir::new().unwrap();
        let pdf = write_file(&dir, "chapter1.pdf", b"%PDF-1.7");
        let txt = write_file(&dir, "chapter2.txt", b"plain");

        let mut selector = FileSelector::new();
        selector.browse(&pdf).unwrap();
        assert!(selector.browse(&txt).is_err());
        assert!(selector.staged().is_none());
        assert_eq!(selector.status().unwrap().message, "Please select a valid PDF file");

        let err = selector.require_staged().unwrap_err();
        assert_eq!(err.user_message(), "Please select a PDF file first");
    }

    #[test]
    fn test_invalid_drop_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        let pdf = write_file(&dir, "chapter1.pdf", b"%PDF-1.7");
        let txt = write_file(&dir, "chapter2.txt", b"plain");

        let mut selector = FileSelector::new();
        selector.browse(&pdf).unwrap();
        assert!(selector.drop_file(txt.to_str().unwrap()).is_err());
        assert_eq!(selector.staged().unwrap().name, "chapter1.pdf");
        assert_eq!(selector.status().unwrap().message, "Please drop a valid PDF file");
    }

    #[test]
    fn test_missing_file_and_directories_are_rejected() {
        let dir = TempDir::new().unwrap();
        let mut selector = FileSelector::new();

        assert!(selector.browse(dir.path().join("missing.pdf")).is_err());

        let folder = dir.path().join("folder.pdf");
        std::fs::create_dir(&folder).unwrap();
        assert!(selector.browse(&folder).is_err());
        assert!(selector.staged().is_none());
    }

    #[test]
    fn test_require_staged_without_selection() {
        let mut selector = FileSelector::new();
        let err = selector.require_staged().unwrap_err();
        assert_eq!(err.user_message(), "Please select a PDF file first");
        assert!(selector.status().unwrap().is_error());
    }

    #[test]
    fn test_dropped_paths_are_normalized() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "my notes.pdf", b"%PDF-1.4");
        let raw = path.to_str().unwrap();

        let mut selector = FileSelector::new();
        selector.drop_file(&format!("'{}'\n", raw)).unwrap();
        selector.drop_file(&format!("file://{}", raw)).unwrap();
        selector.drop_file(&raw.replace(' ', "\\ ")).unwrap();
        assert_eq!(selector.staged().unwrap().name, "my notes.pdf");
    }

    #[test]
    fn test_percent_encoded_file_url_drop_is_decoded() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "week 3 (notes).pdf", b"%PDF-1.4");
        let url = Url::from_file_path(&path).unwrap();
        assert!(url.as_str().contains("%20"));

        let mut selector = FileSelector::new();
        selector.drop_file(&format!("{}\n", url)).unwrap();
        let staged = selector.staged().unwrap();
        assert_eq!(staged.name, "week 3 (notes).pdf");
        assert_eq!(staged.path, path);
    }
}
