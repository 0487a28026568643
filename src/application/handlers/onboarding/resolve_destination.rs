//! ResolveDestinationHandler - stateless onboarding decision for one
//! request, used by the HTTP layer.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode, Identity};
use crate::domain::onboarding::{resolve, Destination, NavigationMode, Screen};
use crate::ports::ProfileRepository;

/// Decision for a requested screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardDecision {
    pub destination: Destination,
    pub allowed: bool,
    /// Path to navigate to when the screen is not allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<NavigationMode>,
}

pub struct ResolveDestinationHandler {
    profiles: Arc<dyn ProfileRepository>,
    fetch_timeout: Duration,
}

impl ResolveDestinationHandler {
    pub fn new(profiles: Arc<dyn ProfileRepository>, fetch_timeout: Duration) -> Self {
        Self {
            profiles,
            fetch_timeout,
        }
    }

    pub async fn destination(&self, identity: Option<&Identity>) -> Result<Destination, DomainError> {
        let Some(identity) = identity else {
            return Ok(resolve(false, None));
        };
        let profile = tokio::time::timeout(
            self.fetch_timeout,
            self.profiles.find_by_id(&identity.user_id),
        )
        .await
        .map_err(|_| DomainError::new(ErrorCode::Timeout, "Profile fetch timed out"))??;
        Ok(resolve(true, profile.as_ref()))
    }

    /// Decides whether `screen` may be shown and where to go otherwise.
    pub async fn handle(
        &self,
        identity: Option<&Identity>,
        screen: Screen,
    ) -> Result<GuardDecision, DomainError> {
        let destination = self.destination(identity).await?;
        if destination.permits(&screen) {
            return Ok(GuardDecision {
                destination,
                allowed: true,
                redirect_to: None,
                mode: None,
            });
        }
        Ok(GuardDecision {
            destination,
            allowed: false,
            redirect_to: Some(destination.path()),
            mode: Some(screen.leave_mode()),
        })
    }
}
