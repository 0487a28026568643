//! PostgREST implementation of SurveyRepository over `medical_surveys`.

use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::user::MedicalSurvey;
use crate::ports::SurveyRepository;

use super::client::SupabaseClient;

const TABLE: &str = "medical_surveys";

pub struct SupabaseSurveyRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseSurveyRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SurveyRepository for SupabaseSurveyRepository {
    async fn upsert(&self, survey: &MedicalSurvey) -> Result<(), DomainError> {
        let request = self
            .client
            .rest(Method::POST, TABLE)?
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(survey);

        self.client.send(request).await?;
        tracing::info!(user_id = %survey.user_id, "Survey stored");
        Ok(())
    }
}
