//! CommunityAccess - the onboarding gate in front of every feed operation.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, Identity};
use crate::domain::onboarding::{resolve, Destination};
use crate::domain::user::Profile;
use crate::ports::ProfileRepository;

pub struct CommunityAccess {
    profiles: Arc<dyn ProfileRepository>,
}

impl CommunityAccess {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Returns the caller's profile when onboarding resolves to the feed.
    ///
    /// Otherwise fails with `Forbidden`; the `redirect` detail carries the
    /// path the caller belongs on.
    pub async fn ensure(&self, identity: &Identity) -> Result<Profile, DomainError> {
        let profile = self.profiles.find_by_id(&identity.user_id).await?;
        match (resolve(true, profile.as_ref()), profile) {
            (Destination::Posts, Some(profile)) => Ok(profile),
            (destination, _) => {
                tracing::debug!(
                    user_id = %identity.user_id,
                    destination = %destination,
                    "Community access denied"
                );
                Err(DomainError::new(
                    ErrorCode::Forbidden,
                    "Finish onboarding before using the community",
                )
                .with_detail("redirect", destination.path()))
            }
        }
    }
}
