// Firebase Identity Toolkit REST provider

use crate::auth::{AuthSession, Credentials, IdentityProvider};
use crate::config::IdentityConfig;
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub struct FirebaseIdentity {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: String,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Seconds, sent as a string
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseIdentity {
    pub fn new(api_key: impl Into<String>, endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &IdentityConfig) -> Option<Self> {
        config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(|key| Self::new(key, &config.endpoint))
    }

    async fn exchange(&self, method: &str, credentials: &Credentials) -> AppResult<AuthSession> {
        let url = format!("{}/accounts:{}", self.endpoint, method);
        let body = PasswordRequest {
            email: &credentials.email,
            password: &credentials.password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            return Err(AppError::Auth(reason));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Invalid token response: {}", e)))?;
        debug!(method, user_id = %tokens.local_id, "Identity provider accepted credentials");

        Ok(AuthSession {
            user_id: tokens.local_id,
            email: tokens.email.unwrap_or_else(|| credentials.email.clone()),
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
            expires_in_secs: tokens.expires_in.and_then(|s| s.parse().ok()),
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_up(&self, credentials: &Credentials) -> AppResult<AuthSession> {
        self.exchange("signUp", credentials).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> AppResult<AuthSession> {
        self.exchange("signInWithPassword", credentials).await
    }
}
