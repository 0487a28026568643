//! In-memory profile repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::user::{NewProfile, Profile, ProfileUpdate};
use crate::ports::ProfileRepository;

use super::lock;

/// Profile rows keyed by user id, with knobs for failure injection.
#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<UserId, Profile>>,
    read_failure: Mutex<Option<DomainError>>,
    write_failure: Mutex<Option<DomainError>>,
    delay: Mutex<Option<Duration>>,
    stale_reads: AtomicUsize,
    finds: AtomicUsize,
    inserts: AtomicUsize,
    updates: AtomicUsize,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a stored row.
    pub async fn with_profile(self, profile: Profile) -> Self {
        self.profiles
            .write()
            .await
            .insert(profile.id.clone(), profile);
        self
    }

    // === Test Helpers ===

    pub async fn stored(&self, id: &UserId) -> Option<Profile> {
        self.profiles.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Makes `find_by_id` fail until cleared.
    pub fn fail_reads_with(&self, error: DomainError) {
        *lock(&self.read_failure) = Some(error);
    }

    /// Makes `insert` and `update` fail until cleared.
    pub fn fail_writes_with(&self, error: DomainError) {
        *lock(&self.write_failure) = Some(error);
    }

    pub fn clear_failures(&self) {
        lock(&self.read_failure).take();
        lock(&self.write_failure).take();
    }

    /// Delays every `find_by_id` call.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *lock(&self.delay) = delay;
    }

    /// The next `count` calls to `find_by_id` report no row even when one
    /// is stored, as a read racing another writer would.
    pub fn stale_reads(&self, count: usize) {
        self.stale_reads.store(count, Ordering::SeqCst);
    }

    pub fn find_calls(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn write_failure(&self) -> Option<DomainError> {
        lock(&self.write_failure).clone()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Profile>, DomainError> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = lock(&self.read_failure).clone();
        if let Some(error) = failure {
            return Err(error);
        }
        let stale = self
            .stale_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if stale {
            return Ok(None);
        }
        Ok(self.profiles.read().await.get(id).cloned())
    }

    async fn insert(&self, profile: &NewProfile) -> Result<Profile, DomainError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.write_failure() {
            return Err(error);
        }
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.id) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "duplicate key value violates unique constraint \"user_profiles_pkey\"",
            )
            .with_detail("id", profile.id.to_string()));
        }
        let stored = Profile::from_new(profile.clone(), Timestamp::now());
        profiles.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: &UserId, update: &ProfileUpdate) -> Result<Profile, DomainError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.write_failure() {
            return Err(error);
        }
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(id).ok_or_else(|| {
            DomainError::new(ErrorCode::ProfileNotFound, "Profile not found")
                .with_detail("id", id.to_string())
        })?;
        profile.apply(update, Timestamp::now());
        Ok(profile.clone())
    }
}
