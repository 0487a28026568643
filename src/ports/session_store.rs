//! Session store port - the client's view of its authentication session.
//!
//! A `SessionStore` belongs to one client session. It reports the current
//! identity, performs sign-in/sign-up/sign-out against the auth backend and
//! publishes identity changes through a `watch` channel.

use async_trait::async_trait;
use secrecy::Secret;
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::foundation::{AuthError, Identity};

/// Email and password pair submitted to the auth backend.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: Secret<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Secret::new(password.into()),
        }
    }
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpResult {
    /// Present when the backend signed the user in right away.
    pub identity: Option<Identity>,
}

impl SignUpResult {
    /// The backend wants the email confirmed before issuing a session.
    pub fn email_confirmation_required(&self) -> bool {
        self.identity.is_none()
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the signed-in identity, or `None` without a session.
    async fn current_session(&self) -> Result<Option<Identity>, AuthError>;

    /// Receiver notified on every identity change (sign-in, sign-out,
    /// token refresh for another user).
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthError>;

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpResult, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Bearer token of the current session, if any.
    fn access_token(&self) -> Option<Secret<String>>;
}

/// Opens a fresh, empty session store per client session.
pub trait SessionStoreFactory: Send + Sync {
    fn open(&self) -> Arc<dyn SessionStore>;
}
