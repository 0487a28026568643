//! CompleteProfileHandler - records the gender chosen on the
//! complete-profile screen.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, Identity, ValidationError};
use crate::domain::onboarding::{resolve, Destination};
use crate::domain::user::{Gender, NewProfile, Profile, ProfileUpdate};
use crate::ports::ProfileRepository;

#[derive(Debug, Clone)]
pub struct CompleteProfileCommand {
    pub gender: Gender,
}

pub struct CompleteProfileHandler {
    profiles: Arc<dyn ProfileRepository>,
}

impl CompleteProfileHandler {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Stores the gender and returns where the user goes next: the survey
    /// for female profiles, the feed for everyone else.
    ///
    /// Only callers the resolver places on `CompleteProfile` may submit;
    /// everyone else gets `Forbidden` with a `redirect` detail.
    pub async fn handle(
        &self,
        identity: &Identity,
        cmd: CompleteProfileCommand,
    ) -> Result<Destination, DomainError> {
        if !cmd.gender.is_set() {
            return Err(ValidationError::empty_field("gender").into());
        }

        let existing = self.profiles.find_by_id(&identity.user_id).await?;
        ensure_on_complete_profile(identity, existing.as_ref())?;

        let profile = match existing {
            None => {
                let new = NewProfile::for_identity(identity, None).with_gender(cmd.gender);
                match self.profiles.insert(&new).await {
                    Ok(profile) => profile,
                    Err(err) if err.code == ErrorCode::Conflict => {
                        let current = self
                            .profiles
                            .find_by_id(&identity.user_id)
                            .await?
                            .ok_or(err)?;
                        ensure_on_complete_profile(identity, Some(&current))?;
                        self.profiles
                            .update(&identity.user_id, &ProfileUpdate::gender_choice(cmd.gender))
                            .await?
                    }
                    Err(err) => return Err(err),
                }
            }
            Some(_) => {
                self.profiles
                    .update(&identity.user_id, &ProfileUpdate::gender_choice(cmd.gender))
                    .await?
            }
        };

        let destination = resolve(true, Some(&profile));
        tracing::info!(
            user_id = %identity.user_id,
            gender = %cmd.gender,
            destination = %destination,
            "Profile completed"
        );
        Ok(destination)
    }
}

fn ensure_on_complete_profile(
    identity: &Identity,
    profile: Option<&Profile>,
) -> Result<(), DomainError> {
    match resolve(true, profile) {
        Destination::CompleteProfile => Ok(()),
        destination => {
            tracing::debug!(
                user_id = %identity.user_id,
                destination = %destination,
                "Complete-profile submitted from the wrong step"
            );
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "The profile does not need completing",
            )
            .with_detail("redirect", destination.path()))
        }
    }
}
