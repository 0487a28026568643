//! SignInHandler and SignOutHandler.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Identity, ValidationError};
use crate::domain::user::RegistrationSlot;
use crate::ports::{Credentials, SessionStore};

pub struct SignInHandler {
    sessions: Arc<dyn SessionStore>,
}

impl SignInHandler {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn handle(&self, email: &str, password: &str) -> Result<Identity, DomainError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::empty_field("email").into());
        }
        if password.is_empty() {
            return Err(ValidationError::empty_field("password").into());
        }

        let identity = self
            .sessions
            .sign_in(&Credentials::new(email, password))
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Sign-in failed");
                DomainError::from(err)
            })?;
        tracing::info!(user_id = %identity.user_id, "User signed in");
        Ok(identity)
    }
}

pub struct SignOutHandler {
    sessions: Arc<dyn SessionStore>,
}

impl SignOutHandler {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    /// Ends the session and drops anything still staged.
    pub async fn handle(&self, slot: &RegistrationSlot) -> Result<(), DomainError> {
        slot.clear();
        self.sessions.sign_out().await?;
        tracing::info!("User signed out");
        Ok(())
    }
}
