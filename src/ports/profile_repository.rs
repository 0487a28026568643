//! ProfileRepository port for profile persistence operations

use async_trait::async_trait;

use crate::domain::{
    foundation::{DomainError, UserId},
    user::{NewProfile, Profile, ProfileUpdate},
};

/// Repository for the per-identity profile row.
///
/// # Contract
///
/// - A missing row is `Ok(None)`, never an error.
/// - Inserting an id that already exists fails with `ErrorCode::Conflict`.
/// - Updating a missing row fails with `ErrorCode::ProfileNotFound`.
/// - An unreachable or unconfigured backend is `ErrorCode::NotConfigured`;
///   transient failures are `BackendUnavailable`, `Timeout` or
///   `DatabaseError`.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Profile>, DomainError>;

    /// Inserts a new row and returns it as stored.
    async fn insert(&self, profile: &NewProfile) -> Result<Profile, DomainError>;

    /// Applies a partial update and returns the stored row.
    async fn update(&self, id: &UserId, update: &ProfileUpdate) -> Result<Profile, DomainError>;
}
