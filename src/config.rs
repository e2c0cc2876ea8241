use crate::backend::BackendContract;
use crate::models::SummaryFormat;
use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub identity: IdentityConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub contract: BackendContract,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub format: SummaryFormat,
}

#[derive(Clone)]
pub struct IdentityConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "••••"))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub save_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let poll_interval_ms: u64 = var("NOTEPILOT_POLL_INTERVAL_MS", "2000").parse()?;
        if poll_interval_ms == 0 {
            anyhow::bail!("NOTEPILOT_POLL_INTERVAL_MS must be greater than zero");
        }

        Ok(Self {
            backend: BackendConfig {
                base_url: var("NOTEPILOT_API_URL", DEFAULT_API_URL)
                    .trim_end_matches('/')
                    .to_string(),
                contract: var("NOTEPILOT_BACKEND_CONTRACT", "polling").parse()?,
                poll_interval: Duration::from_millis(poll_interval_ms),
                request_timeout: Duration::from_secs(
                    var("NOTEPILOT_REQUEST_TIMEOUT_SECS", "120").parse()?,
                ),
                format: var("NOTEPILOT_SUMMARY_FORMAT", "1").parse()?,
            },
            identity: IdentityConfig {
                api_key: lookup("FIREBASE_API_KEY").filter(|k| !k.trim().is_empty()),
                endpoint: var("FIREBASE_AUTH_URL", DEFAULT_IDENTITY_URL)
                    .trim_end_matches('/')
                    .to_string(),
            },
            output: OutputConfig {
                save_dir: PathBuf::from(var("NOTEPILOT_OUTPUT_DIR", ".")),
                log_dir: lookup("NOTEPILOT_LOG_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_log_dir),
            },
        })
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notepilot")
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_observed_backend() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.contract, BackendContract::Polling);
        assert_eq!(config.backend.poll_interval, Duration::from_millis(2000));
        assert_eq!(config.backend.format, SummaryFormat::CheatSheet);
        assert!(config.identity.api_key.is_none());
        assert_eq!(config.identity.endpoint, DEFAULT_IDENTITY_URL);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("NOTEPILOT_API_URL", "https://notes.example.com/"),
            ("NOTEPILOT_BACKEND_CONTRACT", "direct"),
            ("NOTEPILOT_POLL_INTERVAL_MS", "500"),
            ("NOTEPILOT_SUMMARY_FORMAT", "2"),
            ("FIREBASE_API_KEY", "test-key"),
            ("NOTEPILOT_LOG_DIR", "/var/log/notepilot"),
        ]))
        .unwrap();

        assert_eq!(config.backend.base_url, "https://notes.example.com");
        assert_eq!(config.backend.contract, BackendContract::Direct);
        assert_eq!(config.backend.poll_interval, Duration::from_millis(500));
        assert_eq!(config.backend.format, SummaryFormat::DetailedNotes);
        assert_eq!(config.identity.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.output.log_dir, PathBuf::from("/var/log/notepilot"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("NOTEPILOT_POLL_INTERVAL_MS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("NOTEPILOT_BACKEND_CONTRACT", "grpc")])).is_err());
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("NOTEPILOT_POLL_INTERVAL_MS", "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));

        let config = Config::from_lookup(lookup_from(&[("NOTEPILOT_POLL_INTERVAL_MS", "1")])).unwrap();
        assert_eq!(config.backend.poll_interval, Duration::from_millis(1));
    }

    #[test]
    fn test_api_key_is_redacted_in_debug_output() {
        let config = Config::from_lookup(lookup_from(&[("FIREBASE_API_KEY", "secret-123")])).unwrap();
        let rendered = format!("{:?}", config.identity);
        assert!(!rendered.contains("secret-123"));
    }
}
