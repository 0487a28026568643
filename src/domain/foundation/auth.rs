//! Authentication types for the domain layer.
//!
//! `Identity` is what the session backend tells us about the signed-in user.
//! It carries no provider-specific data: the Supabase adapter, the JWT
//! validator and the in-memory session store all populate the same struct.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{DomainError, ErrorCode, UserId};

/// The currently authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable identifier from the auth backend.
    pub user_id: UserId,

    /// Email address, when the backend exposes it.
    pub email: Option<String>,

    /// Display name from federated-identity metadata, used only to pre-fill a
    /// profile at creation.
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Authentication errors raised by session stores and validators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Email/password pair rejected by the backend.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Sign-up rejected (e.g. email already registered, weak password).
    #[error("Sign-up rejected: {0}")]
    SignUpRejected(String),

    /// The auth backend has no URL or key configured.
    #[error("Auth backend not configured")]
    NotConfigured,

    /// The authentication service is unavailable (network, 5xx, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        let code = match &err {
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::InvalidCredentials => {
                ErrorCode::Unauthorized
            }
            AuthError::SignUpRejected(_) => ErrorCode::ValidationFailed,
            AuthError::NotConfigured => ErrorCode::NotConfigured,
            AuthError::ServiceUnavailable(_) => ErrorCode::BackendUnavailable,
        };
        DomainError::new(code, err.to_string())
    }
}
