//! PostgREST implementation of ProfileRepository over `user_profiles`.

use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::{NewProfile, Profile, ProfileUpdate};
use crate::ports::ProfileRepository;

use super::client::SupabaseClient;

const TABLE: &str = "user_profiles";

/// Accept header asking PostgREST for exactly one object.
pub(crate) const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

pub struct SupabaseProfileRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseProfileRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

pub(crate) fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl ProfileRepository for SupabaseProfileRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Profile>, DomainError> {
        let request = self
            .client
            .rest(Method::GET, TABLE)?
            .query(&[("select", "*".to_string()), ("id", eq(id))])
            .header("Accept", SINGLE_OBJECT);

        match self.client.send_json::<Profile>(request).await {
            Ok(profile) => Ok(Some(profile)),
            Err(err) if err.is_no_rows() => Ok(None),
            Err(err) => {
                tracing::warn!(user_id = %id, error = %err, "Profile fetch failed");
                Err(err.into())
            }
        }
    }

    async fn insert(&self, profile: &NewProfile) -> Result<Profile, DomainError> {
        let request = self
            .client
            .rest(Method::POST, TABLE)?
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(profile);

        let inserted: Profile = self.client.send_json(request).await?;
        tracing::info!(user_id = %inserted.id, "Profile created");
        Ok(inserted)
    }

    async fn update(&self, id: &UserId, update: &ProfileUpdate) -> Result<Profile, DomainError> {
        let request = self
            .client
            .rest(Method::PATCH, TABLE)?
            .query(&[("id", eq(id))])
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(update);

        match self.client.send_json::<Profile>(request).await {
            Ok(profile) => Ok(profile),
            Err(err) if err.is_no_rows() => Err(DomainError::new(
                ErrorCode::ProfileNotFound,
                format!("No profile for user {}", id),
            )),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::supabase::SupabaseConfig;

    #[test]
    fn filters_use_postgrest_eq_syntax() {
        let id = UserId::new("8f0c").unwrap();
        assert_eq!(eq(&id), "eq.8f0c");
    }

    #[tokio::test]
    async fn unconfigured_client_reports_not_configured() {
        let client = Arc::new(SupabaseClient::new(SupabaseConfig::new("", "")).unwrap());
        let repo = SupabaseProfileRepository::new(client);

        let err = repo
            .find_by_id(&UserId::new("u1").unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotConfigured);
    }

    #[test]
    fn profile_row_decodes_with_nulls() {
        let row = r#"{
            "id": "u1",
            "first_name": null,
            "last_name": "Aziz",
            "age": null,
            "gender": null,
            "origin_city": null,
            "role": "user",
            "form_completed": false,
            "created_at": "2024-03-08T09:15:00+00:00",
            "updated_at": "2024-03-08T09:15:00+00:00"
        }"#;
        let profile: Profile = serde_json::from_str(row).unwrap();
        assert_eq!(profile.first_name, "");
        assert!(!profile.is_form_completed());
    }
}
