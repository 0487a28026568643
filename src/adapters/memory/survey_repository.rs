//! In-memory survey repository.

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::user::MedicalSurvey;
use crate::ports::SurveyRepository;

use super::lock;

#[derive(Default)]
pub struct InMemorySurveyRepository {
    surveys: RwLock<Vec<MedicalSurvey>>,
    failure: Mutex<Option<DomainError>>,
}

impl InMemorySurveyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn for_user(&self, user_id: &UserId) -> Vec<MedicalSurvey> {
        self.surveys
            .read()
            .await
            .iter()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.surveys.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn fail_with(&self, error: Option<DomainError>) {
        *lock(&self.failure) = error;
    }
}

#[async_trait]
impl SurveyRepository for InMemorySurveyRepository {
    async fn upsert(&self, survey: &MedicalSurvey) -> Result<(), DomainError> {
        let failure = lock(&self.failure).clone();
        if let Some(error) = failure {
            return Err(error);
        }
        let mut stored = survey.clone();
        stored.created_at.get_or_insert_with(Timestamp::now);
        let mut surveys = self.surveys.write().await;
        match surveys.iter_mut().find(|s| s.user_id == stored.user_id) {
            Some(existing) => *existing = stored,
            None => surveys.push(stored),
        }
        Ok(())
    }
}
