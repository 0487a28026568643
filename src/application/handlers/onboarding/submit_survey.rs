//! SubmitSurveyHandler - stores the medical survey and completes the
//! profile.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, Identity};
use crate::domain::onboarding::Destination;
use crate::domain::user::{Gender, MedicalSurvey, ProfileUpdate, SurveySubmission};
use crate::ports::{ProfileRepository, SurveyRepository};

pub struct SubmitSurveyHandler {
    profiles: Arc<dyn ProfileRepository>,
    surveys: Arc<dyn SurveyRepository>,
}

impl SubmitSurveyHandler {
    pub fn new(profiles: Arc<dyn ProfileRepository>, surveys: Arc<dyn SurveyRepository>) -> Self {
        Self { profiles, surveys }
    }

    pub async fn handle(
        &self,
        identity: &Identity,
        submission: SurveySubmission,
    ) -> Result<Destination, DomainError> {
        submission.pregnancy.validate()?;

        let profile = self
            .profiles
            .find_by_id(&identity.user_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::ProfileNotFound, "Complete your profile first")
            })?;

        if profile.gender != Gender::Female {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "The survey is only available to female profiles",
            )
            .with_detail("redirect", Destination::Posts.path()));
        }
        if profile.is_form_completed() {
            tracing::debug!(user_id = %identity.user_id, "Survey already completed");
            return Ok(Destination::Posts);
        }

        let survey = MedicalSurvey::new(identity.user_id.clone(), submission.answers);
        self.surveys.upsert(&survey).await.map_err(|err| {
            tracing::error!(user_id = %identity.user_id, error = %err, "Survey insert failed");
            err
        })?;

        self.profiles
            .update(
                &identity.user_id,
                &ProfileUpdate::survey_completion(&submission.pregnancy),
            )
            .await
            .map_err(|err| {
                tracing::error!(user_id = %identity.user_id, error = %err, "Profile update after survey failed");
                err
            })?;

        tracing::info!(user_id = %identity.user_id, "Survey submitted");
        Ok(Destination::Posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryProfileRepository, InMemorySurveyRepository};
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::user::{
        BirthPlace, DeliveryType, NewProfile, PregnancyInfo, Profile, SurveyAnswers,
    };

    fn identity() -> Identity {
        Identity::new(UserId::new("u1").unwrap())
    }

    fn submission() -> SurveySubmission {
        SurveySubmission {
            pregnancy: PregnancyInfo {
                is_first_pregnancy: false,
                living_children_count: 2,
                delivery_type: DeliveryType::Cesarean,
                birth_place: BirthPlace::PrivateHospital,
            },
            answers: SurveyAnswers {
                gave_consent: true,
                felt_respected: true,
                ..Default::default()
            },
        }
    }

    async fn setup(
        gender: Gender,
    ) -> (
        SubmitSurveyHandler,
        Arc<InMemoryProfileRepository>,
        Arc<InMemorySurveyRepository>,
    ) {
        let new = NewProfile::for_identity(&identity(), None).with_gender(gender);
        let profiles = Arc::new(
            InMemoryProfileRepository::new()
                .with_profile(Profile::from_new(new, Timestamp::now()))
                .await,
        );
        let surveys = Arc::new(InMemorySurveyRepository::new());
        (
            SubmitSurveyHandler::new(profiles.clone(), surveys.clone()),
            profiles,
            surveys,
        )
    }

    #[tokio::test]
    async fn survey_completes_female_profile() {
        let (handler, profiles, surveys) = setup(Gender::Female).await;

        let destination = handler.handle(&identity(), submission()).await.unwrap();

        assert_eq!(destination, Destination::Posts);
        let stored = profiles.stored(&identity().user_id).await.unwrap();
        assert!(stored.is_form_completed());
        assert_eq!(stored.living_children_count, Some(2));
        assert_eq!(surveys.for_user(&identity().user_id).await.len(), 1);
    }

    #[tokio::test]
    async fn second_submission_does_not_write() {
        let (handler, _profiles, surveys) = setup(Gender::Female).await;
        handler.handle(&identity(), submission()).await.unwrap();

        handler.handle(&identity(), submission()).await.unwrap();

        assert_eq!(surveys.len().await, 1);
    }

    #[tokio::test]
    async fn retry_after_failed_profile_update_keeps_one_survey() {
        let (handler, profiles, surveys) = setup(Gender::Female).await;
        profiles.fail_writes_with(DomainError::new(ErrorCode::DatabaseError, "update failed"));

        let err = handler.handle(&identity(), submission()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(surveys.len().await, 1);

        profiles.clear_failures();
        let destination = handler.handle(&identity(), submission()).await.unwrap();

        assert_eq!(destination, Destination::Posts);
        assert_eq!(surveys.len().await, 1);
        assert!(profiles
            .stored(&identity().user_id)
            .await
            .unwrap()
            .is_form_completed());
    }

    #[tokio::test]
    async fn concurrent_submissions_keep_one_survey() {
        let (handler, _profiles, surveys) = setup(Gender::Female).await;
        let identity = identity();

        let (a, b) = tokio::join!(
            handler.handle(&identity, submission()),
            handler.handle(&identity, submission())
        );

        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(surveys.len().await, 1);
    }

    #[tokio::test]
    async fn male_profile_is_forbidden() {
        let (handler, _profiles, surveys) = setup(Gender::Male).await;

        let err = handler.handle(&identity(), submission()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
        assert!(surveys.is_empty().await);
    }

    #[tokio::test]
    async fn failed_survey_insert_leaves_profile_pending() {
        let (handler, profiles, surveys) = setup(Gender::Female).await;
        surveys.fail_with(Some(DomainError::new(ErrorCode::DatabaseError, "boom")));

        assert!(handler.handle(&identity(), submission()).await.is_err());

        assert!(!profiles
            .stored(&identity().user_id)
            .await
            .unwrap()
            .is_form_completed());
    }
}
