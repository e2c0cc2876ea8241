// Direct contract: a single POST /upload (field `pdf`) that answers with
// `{"summary": ...}` or `{"error": ...}`. No session, nothing to poll.

use crate::backend::provider::{rejected, BackendContract, PdfUpload, SummaryBackend};
use crate::models::{StatusReport, Submission, SummaryFormat};
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

const FALLBACK_ERROR: &str = "Something went wrong!";

pub struct HttpDirectBackend {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct DirectResponse {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpDirectBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SummaryBackend for HttpDirectBackend {
    fn contract(&self) -> BackendContract {
        BackendContract::Direct
    }

    async fn submit(&self, upload: &PdfUpload, _format: SummaryFormat) -> AppResult<Submission> {
        let form = reqwest::multipart::Form::new().part("pdf", upload.to_part()?);

        info!(file = %upload.file_name, bytes = upload.bytes.len(), "Uploading PDF (direct)");

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(rejected("Upload", response).await);
        }

        // 4xx bodies still carry `{"error": ...}` which the user should see
        let body: DirectResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(AppError::Network(format!("Invalid upload response: {}", e)))
            }
            Err(_) => {
                return Err(AppError::Network(format!("Upload failed ({})", status)));
            }
        };

        match body.summary {
            Some(summary) if !summary.is_empty() => Ok(Submission::Immediate(summary)),
            _ => {
                let message = body.error.unwrap_or_else(|| FALLBACK_ERROR.to_string());
                warn!(%status, %message, "Backend reported an error");
                Err(AppError::BackendReported(message))
            }
        }
    }

    async fn status(&self, _session_id: &str) -> AppResult<StatusReport> {
        Err(AppError::Internal(
            "the direct contract has no status endpoint".to_string(),
        ))
    }

    async fn download(&self, _session_id: &str) -> AppResult<String> {
        Err(AppError::Internal(
            "the direct contract has no download endpoint".to_string(),
        ))
    }
}
