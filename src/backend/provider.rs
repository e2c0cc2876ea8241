use crate::config::BackendConfig;
use crate::models::{SelectedFile, StatusReport, Submission, SummaryFormat};
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Contract-agnostic view of the summarization service.
///
/// The workflow only talks to this trait, so the two HTTP contracts the
/// service has shipped with can be swapped by configuration.
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    fn contract(&self) -> BackendContract;

    /// Upload one PDF. Returns a session to poll, or the summary itself.
    async fn submit(&self, upload: &PdfUpload, format: SummaryFormat) -> AppResult<Submission>;

    async fn status(&self, session_id: &str) -> AppResult<StatusReport>;

    async fn download(&self, session_id: &str) -> AppResult<String>;
}

/// Which HTTP contract the backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendContract {
    /// `POST /upload` -> session id, then `/status` polling and `/download`
    #[default]
    Polling,
    /// `POST /upload` answers with the summary directly
    Direct,
}

impl fmt::Display for BackendContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendContract::Polling => write!(f, "polling"),
            BackendContract::Direct => write!(f, "direct"),
        }
    }
}

impl FromStr for BackendContract {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "polling" | "poll" => Ok(BackendContract::Polling),
            "direct" | "sync" => Ok(BackendContract::Direct),
            other => Err(AppError::Config(format!("Unsupported backend contract: {}", other))),
        }
    }
}

/// File contents ready to be sent as a multipart part.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl PdfUpload {
    pub async fn read(file: &SelectedFile) -> AppResult<Self> {
        let bytes = tokio::fs::read(&file.path).await.map_err(|e| {
            AppError::Validation(format!("Unable to read {}: {}", file.name, e))
        })?;
        Ok(Self {
            file_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            bytes: Bytes::from(bytes),
        })
    }

    pub fn to_part(&self) -> AppResult<reqwest::multipart::Part> {
        reqwest::multipart::Part::bytes(self.bytes.to_vec())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime_type)
            .map_err(|e| AppError::Internal(format!("Invalid MIME type {}: {}", self.mime_type, e)))
    }
}

/// Build the adapter selected in the configuration.
pub fn create_backend(config: &BackendConfig) -> AppResult<Arc<dyn SummaryBackend>> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

    let backend: Arc<dyn SummaryBackend> = match config.contract {
        BackendContract::Polling => Arc::new(crate::backend::polling::HttpPollingBackend::with_client(
            client,
            &config.base_url,
        )),
        BackendContract::Direct => Arc::new(crate::backend::direct::HttpDirectBackend::with_client(
            client,
            &config.base_url,
        )),
    };

    Ok(backend)
}

/// Read a non-2xx response into a `Network` error, keeping the body for the log.
pub(crate) async fn rejected(stage: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(body);
    AppError::Network(format!("{} failed ({}): {}", stage, status, detail.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PDF_MIME;
    use std::time::Duration;

    #[test]
    fn test_contract_parsing() {
        assert_eq!("polling".parse::<BackendContract>().unwrap(), BackendContract::Polling);
        assert_eq!("Direct".parse::<BackendContract>().unwrap(), BackendContract::Direct);
        assert!("websocket".parse::<BackendContract>().is_err());
        assert_eq!(BackendContract::default().to_string(), "polling");
    }

    #[test]
    fn test_factory_selects_adapter() {
        let mut config = BackendConfig {
            base_url: "http://localhost:8000".to_string(),
            contract: BackendContract::Polling,
            poll_interval: Duration::from_millis(2000),
            request_timeout: Duration::from_secs(5),
            format: SummaryFormat::CheatSheet,
        };
        assert_eq!(create_backend(&config).unwrap().contract(), BackendContract::Polling);

        config.contract = BackendContract::Direct;
        assert_eq!(create_backend(&config).unwrap().contract(), BackendContract::Direct);
    }

    #[tokio::test]
    async fn test_upload_reads_file_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("paper.pdf");
        std::fs::write(&path, b"%PDF-1.5 body").unwrap();
        let file = SelectedFile {
            path,
            name: "paper.pdf".to_string(),
            size_bytes: 13,
            mime_type: PDF_MIME.to_string(),
        };

        let upload = PdfUpload::read(&file).await.unwrap();
        assert_eq!(upload.file_name, "paper.pdf");
        assert_eq!(&upload.bytes[..], b"%PDF-1.5 body");
        assert!(upload.to_part().is_ok());
    }
}
