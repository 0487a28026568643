//! ProfileCompletionWorkflow - ensures an authenticated identity has a
//! profile and applies any staged registration data to it.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode, Identity};
use crate::domain::onboarding::{resolve, Destination};
use crate::domain::user::{
    NewProfile, PendingRegistration, Profile, ProfileUpdate, RegistrationSlot,
};
use crate::ports::ProfileRepository;

/// Profile after the workflow ran, with where the user goes next.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    pub profile: Profile,
    pub destination: Destination,
}

/// Creates or repairs the profile of a freshly authenticated identity.
///
/// Runs are serialized: a second run started while one is in flight waits
/// for it and then sees its result.
pub struct ProfileCompletionWorkflow {
    profiles: Arc<dyn ProfileRepository>,
    run_lock: Mutex<()>,
}

impl ProfileCompletionWorkflow {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            profiles,
            run_lock: Mutex::new(()),
        }
    }

    /// Ensures a profile exists for `identity`.
    ///
    /// - no profile: insert one built from the staged data, or from the
    ///   identity's metadata when nothing is staged
    /// - incomplete profile with staged data: merge the staged data in
    /// - complete profile: no write
    ///
    /// The slot is cleared only after the write succeeded.
    pub async fn run(
        &self,
        identity: &Identity,
        slot: &RegistrationSlot,
    ) -> Result<CompletionOutcome, DomainError> {
        let _guard = self.run_lock.lock().await;
        let staged = slot.peek();

        let existing = self.profiles.find_by_id(&identity.user_id).await?;
        let profile = match existing {
            None => {
                let new = NewProfile::for_identity(identity, staged.as_ref());
                match self.profiles.insert(&new).await {
                    Ok(profile) => {
                        tracing::info!(
                            user_id = %identity.user_id,
                            gender = %profile.gender,
                            form_completed = profile.is_form_completed(),
                            "Profile created"
                        );
                        profile
                    }
                    Err(err) if err.code == ErrorCode::Conflict => {
                        tracing::warn!(
                            user_id = %identity.user_id,
                            "Profile insert raced with another writer, re-fetching"
                        );
                        let current = self
                            .profiles
                            .find_by_id(&identity.user_id)
                            .await?
                            .ok_or(err)?;
                        self.merge_staged(current, staged.as_ref()).await?
                    }
                    Err(err) => {
                        tracing::error!(
                            user_id = %identity.user_id,
                            error = %err,
                            "Profile insert failed"
                        );
                        return Err(err);
                    }
                }
            }
            Some(current) => self.merge_staged(current, staged.as_ref()).await?,
        };

        if staged.is_some() {
            slot.clear();
        }

        let destination = resolve(true, Some(&profile));
        Ok(CompletionOutcome {
            profile,
            destination,
        })
    }

    /// Updates an incomplete profile with staged data. Complete profiles and
    /// runs without staged data are left untouched.
    async fn merge_staged(
        &self,
        current: Profile,
        staged: Option<&PendingRegistration>,
    ) -> Result<Profile, DomainError> {
        let pending = match staged {
            Some(pending) if !current.is_form_completed() => pending,
            _ => return Ok(current),
        };

        let update = ProfileUpdate::from_pending(pending);
        match self.profiles.update(&current.id, &update).await {
            Ok(profile) => {
                tracing::info!(
                    user_id = %profile.id,
                    form_completed = profile.is_form_completed(),
                    "Staged registration merged into profile"
                );
                Ok(profile)
            }
            Err(err) => {
                tracing::error!(user_id = %current.id, error = %err, "Profile update failed");
                Err(err)
            }
        }
    }
}
