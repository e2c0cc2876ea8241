// Polling contract: upload returns a session id, the job is then polled on
// /status/{id} and the text fetched from /download/{id}/txt.

use crate::backend::provider::{rejected, BackendContract, PdfUpload, SummaryBackend};
use crate::models::{StatusReport, Submission, SummaryFormat};
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};

pub struct HttpPollingBackend {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpPollingBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Append `segments` to the base URL, percent-encoding each one so a
    /// session id can never add path segments or a query.
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("Invalid backend URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("Backend URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn upload_url(&self) -> AppResult<Url> {
        self.endpoint(&["upload"])
    }

    fn status_url(&self, session_id: &str) -> AppResult<Url> {
        self.endpoint(&["status", session_id])
    }

    fn download_url(&self, session_id: &str) -> AppResult<Url> {
        self.endpoint(&["download", session_id, "txt"])
    }
}

#[async_trait]
impl SummaryBackend for HttpPollingBackend {
    fn contract(&self) -> BackendContract {
        BackendContract::Polling
    }

    async fn submit(&self, upload: &PdfUpload, format: SummaryFormat) -> AppResult<Submission> {
        let form = reqwest::multipart::Form::new()
            .part("file", upload.to_part()?)
            .text("format", format.as_param());

        info!(file = %upload.file_name, bytes = upload.bytes.len(), %format, "Uploading PDF");

        let response = self.client.post(self.upload_url()?).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(rejected("Upload", response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Network(format!("Invalid upload response: {}", e)))?;

        match body.session_id {
            Some(id) if !id.is_empty() => {
                info!(session_id = %id, "Upload accepted");
                Ok(Submission::Session(id))
            }
            _ => Err(AppError::Network(format!(
                "Upload response missing session_id{}",
                body.error.map(|e| format!(": {}", e)).unwrap_or_default()
            ))),
        }
    }

    async fn status(&self, session_id: &str) -> AppResult<StatusReport> {
        let response = self.client.get(self.status_url(session_id)?).send().await?;
        if !response.status().is_success() {
            return Err(rejected("Status check", response).await);
        }

        let report: StatusReport = response
            .json()
            .await
            .map_err(|e| AppError::Network(format!("Invalid status response: {}", e)))?;
        debug!(session_id, status = %report.status, step = ?report.step, "Status polled");
        Ok(report)
    }

    async fn download(&self, session_id: &str) -> AppResult<String> {
        let response = self.client.get(self.download_url(session_id)?).send().await?;
        if !response.status().is_success() {
            return Err(rejected("Download", response).await);
        }

        let text = response.text().await?;
        info!(session_id, chars = text.len(), "Summary downloaded");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mockito::{Matcher, Server};

    fn sample_upload() -> PdfUpload {
        PdfUpload {
            file_name: "lecture.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF-1.4 lecture notes"),
        }
    }

    #[test]
    fn test_urls_are_built_from_base() {
        let backend = HttpPollingBackend::new("http://localhost:8000/");
        assert_eq!(backend.upload_url().unwrap().as_str(), "http://localhost:8000/upload");
        assert_eq!(backend.status_url("abc").unwrap().as_str(), "http://localhost:8000/status/abc");
        assert_eq!(
            backend.download_url("abc").unwrap().as_str(),
            "http://localhost:8000/download/abc/txt"
        );

        let nested = HttpPollingBackend::new("https://notes.example.com/api/");
        assert_eq!(nested.status_url("abc").unwrap().as_str(), "https://notes.example.com/api/status/abc");
    }

    #[test]
    fn test_session_id_cannot_change_the_route() {
        let backend = HttpPollingBackend::new("http://localhost:8000");
        let url = backend.status_url("../upload?x=1#frag").unwrap();
        assert_eq!(url.path(), "/status/..%2Fupload%3Fx=1%23frag");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());

        let url = backend.download_url("a/b").unwrap();
        assert_eq!(url.path(), "/download/a%2Fb/txt");
    }

    #[tokio::test]
    async fn unparseable_base_url_is_a_config_error() {
        let backend = HttpPollingBackend::new("not a url");
        let err = backend.status("abc").await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn submit_sends_file_and_format_fields() {
        let mut server = Server::new_async().await;
        let upload_mock = server
            .mock("POST", "/upload")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="lecture.pdf""#.to_string()),
                Matcher::Regex(r"(?i)content-type: application/pdf".to_string()),
                Matcher::Regex(r"%PDF-1\.4 lecture notes".to_string()),
                Matcher::Regex(r#"name="format"\r\n\r\n1\r\n"#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"session_id": "3f2c9b1e"}"#)
            .expect(1)
            .create_async()
            .await;

        let backend = HttpPollingBackend::new(&server.url());
        let submission = backend
            .submit(&sample_upload(), SummaryFormat::CheatSheet)
            .await
            .expect("upload should succeed");

        upload_mock.assert_async().await;
        assert_eq!(submission, Submission::Session("3f2c9b1e".to_string()));
    }

    #[tokio::test]
    async fn submit_non_2xx_is_network_error() {
        let mut server = Server::new_async().await;
        let upload_mock = server
            .mock("POST", "/upload")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "No file uploaded"}"#)
            .create_async()
            .await;

        let backend = HttpPollingBackend::new(&server.url());
        let err = backend
            .submit(&sample_upload(), SummaryFormat::CheatSheet)
            .await
            .unwrap_err();

        upload_mock.assert_async().await;
        match err {
            AppError::Network(detail) => assert!(detail.contains("No file uploaded")),
            other => panic!("expected network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn submit_without_session_id_is_network_error() {
        let mut server = Server::new_async().await;
        let _upload_mock = server
            .mock("POST", "/upload")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "ok"}"#)
            .create_async()
            .await;

        let backend = HttpPollingBackend::new(&server.url());
        let err = backend
            .submit(&sample_upload(), SummaryFormat::DetailedNotes)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
    }

    #[tokio::test]
    async fn status_reads_processing_step() {
        let mut server = Server::new_async().await;
        let status_mock = server
            .mock("GET", "/status/abc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "processing", "step": "generating_summary"}"#)
            .create_async()
            .await;

        let backend = HttpPollingBackend::new(&server.url());
        let report = backend.status("abc").await.unwrap();

        status_mock.assert_async().await;
        assert_eq!(report.status, "processing");
        assert_eq!(report.step.as_deref(), Some("generating_summary"));
    }

    #[tokio::test]
    async fn download_returns_plain_text() {
        let mut server = Server::new_async().await;
        let download_mock = server
            .mock("GET", "/download/abc/txt")
            .with_status(200)
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_body("## Quick Reference\n- F = ma")
            .create_async()
            .await;

        let backend = HttpPollingBackend::new(&server.url());
        let text = backend.download("abc").await.unwrap();

        download_mock.assert_async().await;
        assert_eq!(text, "## Quick Reference\n- F = ma");
    }

    #[tokio::test]
    async fn download_not_ready_is_network_error() {
        let mut server = Server::new_async().await;
        let _download_mock = server
            .mock("GET", "/download/abc/txt")
            .with_status(404)
            .with_body("File not ready")
            .create_async()
            .await;

        let backend = HttpPollingBackend::new(&server.url());
        let err = backend.download("abc").await.unwrap_err();
        match err {
            AppError::Network(detail) => assert!(detail.contains("File not ready")),
            other => panic!("expected network error, got {:?}", other),
        }
    }
}
