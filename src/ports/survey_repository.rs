//! SurveyRepository port - stores medical survey answers.

use async_trait::async_trait;

use crate::domain::{foundation::DomainError, user::MedicalSurvey};

#[async_trait]
pub trait SurveyRepository: Send + Sync {
    /// Stores the user's answers. A user has at most one row; submitting
    /// again replaces it.
    async fn upsert(&self, survey: &MedicalSurvey) -> Result<(), DomainError>;
}
