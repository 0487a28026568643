//! RegisterHandler - validates the registration form, stages its data and
//! signs the user up.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Identity};
use crate::domain::user::{PendingRegistration, RegistrationForm, RegistrationSlot};
use crate::ports::{Credentials, SessionStore};

/// Result of a successful sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// Present when the backend signed the user in right away.
    pub identity: Option<Identity>,
    pub email_confirmation_required: bool,
    /// What was staged, for clients that carry it across the confirmation
    /// round trip themselves.
    pub staged: PendingRegistration,
}

pub struct RegisterHandler {
    sessions: Arc<dyn SessionStore>,
}

impl RegisterHandler {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn handle(
        &self,
        form: RegistrationForm,
        slot: &RegistrationSlot,
    ) -> Result<SignUpOutcome, DomainError> {
        let pending = form.validate()?;
        slot.stage(pending.clone());

        let credentials = Credentials::new(form.email.trim(), form.password);
        match self.sessions.sign_up(&credentials).await {
            Ok(result) => {
                tracing::info!(
                    email_confirmation_required = result.email_confirmation_required(),
                    "User signed up"
                );
                Ok(SignUpOutcome {
                    email_confirmation_required: result.email_confirmation_required(),
                    identity: result.identity,
                    staged: pending,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "Sign-up rejected");
                slot.clear();
                Err(err.into())
            }
        }
    }
}
