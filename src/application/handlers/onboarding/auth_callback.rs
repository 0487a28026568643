//! AuthCallbackHandler - the screen the auth backend returns to after a
//! sign-in or email confirmation.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::onboarding::{Destination, NavigationMode};
use crate::domain::user::RegistrationSlot;
use crate::ports::{Navigator, SessionStore};

use super::ProfileCompletionWorkflow;

pub struct AuthCallbackHandler {
    sessions: Arc<dyn SessionStore>,
    workflow: Arc<ProfileCompletionWorkflow>,
    navigator: Arc<dyn Navigator>,
}

impl AuthCallbackHandler {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        workflow: Arc<ProfileCompletionWorkflow>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            sessions,
            workflow,
            navigator,
        }
    }

    /// Completes the profile and leaves the callback screen.
    ///
    /// Without a session the user goes back to login. If the workflow fails
    /// the user stays on the callback screen and the error is returned.
    pub async fn handle(&self, slot: &RegistrationSlot) -> Result<Destination, DomainError> {
        let identity = match self.sessions.current_session().await? {
            Some(identity) => identity,
            None => {
                tracing::info!("Auth callback without session, returning to login");
                self.navigator
                    .navigate(Destination::Login.path(), NavigationMode::Replace);
                return Ok(Destination::Login);
            }
        };

        let outcome = self.workflow.run(&identity, slot).await?;
        tracing::info!(
            user_id = %identity.user_id,
            destination = %outcome.destination,
            "Auth callback complete"
        );
        self.navigator
            .navigate(outcome.destination.path(), NavigationMode::Replace);
        Ok(outcome.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryProfileRepository, InMemorySessionStore, RecordingNavigator,
    };
    use crate::domain::foundation::{ErrorCode, Identity, UserId};
    use crate::domain::user::{Gender, PendingRegistration};

    fn handler(
        session: Option<Identity>,
    ) -> (
        AuthCallbackHandler,
        Arc<InMemoryProfileRepository>,
        Arc<RecordingNavigator>,
    ) {
        let sessions = Arc::new(InMemorySessionStore::new());
        sessions.set_session(session);
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let navigator = Arc::new(RecordingNavigator::at("/auth/callback"));
        let workflow = Arc::new(ProfileCompletionWorkflow::new(profiles.clone()));
        (
            AuthCallbackHandler::new(sessions, workflow, navigator.clone()),
            profiles,
            navigator,
        )
    }

    #[tokio::test]
    async fn no_session_returns_to_login() {
        let (handler, profiles, navigator) = handler(None);

        let destination = handler.handle(&RegistrationSlot::new()).await.unwrap();

        assert_eq!(destination, Destination::Login);
        assert_eq!(
            navigator.last(),
            Some(("/auth/login".to_string(), NavigationMode::Replace))
        );
        assert!(profiles.is_empty().await);
    }

    #[tokio::test]
    async fn female_registration_lands_on_survey() {
        let identity = Identity::new(UserId::new("u1").unwrap());
        let (handler, _profiles, navigator) = handler(Some(identity));
        let slot = RegistrationSlot::with_pending(Some(PendingRegistration {
            first_name: "Maya".to_string(),
            last_name: "Odeh".to_string(),
            age: None,
            gender: Gender::Female,
            origin_city: None,
        }));

        let destination = handler.handle(&slot).await.unwrap();

        assert_eq!(destination, Destination::Survey);
        assert_eq!(
            navigator.navigations(),
            vec![("/survey".to_string(), NavigationMode::Replace)]
        );
        assert!(slot.is_empty());
    }

    #[tokio::test]
    async fn workflow_failure_stays_on_callback() {
        let identity = Identity::new(UserId::new("u1").unwrap());
        let (handler, profiles, navigator) = handler(Some(identity));
        profiles.fail_reads_with(DomainError::new(ErrorCode::BackendUnavailable, "down"));

        let err = handler.handle(&RegistrationSlot::new()).await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(navigator.count(), 0);
        assert_eq!(navigator.current_path().as_deref(), Some("/auth/callback"));
    }
}
