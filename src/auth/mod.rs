//! Auth Gate
//!
//! Sign-up and log-in against an external identity provider. The gate only
//! turns the provider's answer into a notice for the user; it has no access
//! to summaries or workflow state.

pub mod firebase;

pub use firebase::FirebaseIdentity;

use crate::types::{AppError, AppResult, Notice};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

pub const SIGN_UP_SUCCESS: &str = "Signed up successfully!";
pub const SIGN_UP_FAILURE: &str = "Failed to meet requirements. Please try again.";
pub const LOG_IN_SUCCESS: &str = "Logged in successfully";
pub const LOG_IN_FAILURE: &str = "Failed to Log in. Please try again.";

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Tokens handed back by the provider after a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub expires_in_secs: Option<u64>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> AppResult<AuthSession>;

    async fn sign_in(&self, credentials: &Credentials) -> AppResult<AuthSession>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    SignUp,
    LogIn,
}

impl AuthAction {
    fn messages(&self) -> (&'static str, &'static str) {
        match self {
            AuthAction::SignUp => (SIGN_UP_SUCCESS, SIGN_UP_FAILURE),
            AuthAction::LogIn => (LOG_IN_SUCCESS, LOG_IN_FAILURE),
        }
    }
}

impl fmt::Display for AuthAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthAction::SignUp => write!(f, "sign-up"),
            AuthAction::LogIn => write!(f, "log-in"),
        }
    }
}

/// What the user sees after an auth attempt, plus the session on success.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub action: AuthAction,
    pub notice: Notice,
    pub session: Option<AuthSession>,
}

impl AuthOutcome {
    pub fn succeeded(&self) -> bool {
        self.session.is_some()
    }
}

#[derive(Clone)]
pub struct AuthGate {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthGate {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub async fn sign_up(&self, credentials: &Credentials) -> AuthOutcome {
        self.attempt(AuthAction::SignUp, credentials).await
    }

    pub async fn log_in(&self, credentials: &Credentials) -> AuthOutcome {
        self.attempt(AuthAction::LogIn, credentials).await
    }

    pub async fn attempt(&self, action: AuthAction, credentials: &Credentials) -> AuthOutcome {
        let (success, failure) = action.messages();

        if let Err(e) = credentials.validate() {
            return AuthOutcome {
                action,
                notice: Notice::error(e.user_message()),
                session: None,
            };
        }

        let result = match action {
            AuthAction::SignUp => self.provider.sign_up(credentials).await,
            AuthAction::LogIn => self.provider.sign_in(credentials).await,
        };

        match result {
            Ok(session) => {
                info!(%action, user_id = %session.user_id, "Authentication succeeded");
                AuthOutcome {
                    action,
                    notice: Notice::success(success),
                    session: Some(session),
                }
            }
            Err(e) => {
                warn!(%action, email = %credentials.email, error = %e, "Authentication failed");
                AuthOutcome {
                    action,
                    notice: Notice::error(failure),
                    session: None,
                }
            }
        }
    }
}
