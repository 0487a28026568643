//! In-memory auth backend, session stores and token validator.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crate::domain::foundation::{AuthError, Identity, UserId};
use crate::ports::{
    Credentials, SessionStore, SessionStoreFactory, SessionValidator, SignUpResult,
};

use super::lock;

struct Account {
    password: String,
    identity: Identity,
}

#[derive(Default)]
struct AuthState {
    accounts: RwLock<HashMap<String, Account>>,
    tokens: RwLock<HashMap<String, Identity>>,
    auto_confirm: bool,
}

/// Shared account directory. Opens session stores and validates the tokens
/// they issue.
#[derive(Clone)]
pub struct InMemoryAuth {
    state: Arc<AuthState>,
}

impl InMemoryAuth {
    /// Backend that signs users in immediately after sign-up.
    pub fn new() -> Self {
        Self::with_confirmation(false)
    }

    /// Backend that requires email confirmation when `required` is true.
    pub fn with_confirmation(required: bool) -> Self {
        Self {
            state: Arc::new(AuthState {
                auto_confirm: !required,
                ..Default::default()
            }),
        }
    }

    /// Registers an account directly.
    pub async fn add_account(&self, email: &str, password: &str, identity: Identity) {
        self.state.accounts.write().await.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                identity,
            },
        );
    }

    /// Issues a token for `identity` without a sign-in.
    pub async fn issue_token(&self, identity: Identity) -> String {
        let token = format!("mem-{}", Uuid::new_v4());
        self.state
            .tokens
            .write()
            .await
            .insert(token.clone(), identity);
        token
    }

    pub fn open_store(&self) -> InMemorySessionStore {
        InMemorySessionStore::with_state(self.state.clone())
    }
}

impl Default for InMemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStoreFactory for InMemoryAuth {
    fn open(&self) -> Arc<dyn SessionStore> {
        Arc::new(self.open_store())
    }
}

#[async_trait]
impl SessionValidator for InMemoryAuth {
    async fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        self.state
            .tokens
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Session store of one client, backed by an `InMemoryAuth` directory.
pub struct InMemorySessionStore {
    state: Arc<AuthState>,
    session: watch::Sender<Option<Identity>>,
    token: Mutex<Option<String>>,
    failure: Mutex<Option<AuthError>>,
    delay: Mutex<Option<Duration>>,
}

impl InMemorySessionStore {
    /// Store without a session and with its own account directory.
    pub fn new() -> Self {
        Self::with_state(Arc::new(AuthState {
            auto_confirm: true,
            ..Default::default()
        }))
    }

    fn with_state(state: Arc<AuthState>) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            state,
            session,
            token: Mutex::new(None),
            failure: Mutex::new(None),
            delay: Mutex::new(None),
        }
    }

    /// Store that already holds a session for `identity`.
    pub fn signed_in(identity: Identity) -> Self {
        let store = Self::new();
        store.set_session(Some(identity));
        store
    }

    // === Test Helpers ===

    /// Replaces the session and notifies subscribers, as a sign-in or
    /// sign-out in another tab would.
    pub fn set_session(&self, identity: Option<Identity>) {
        self.session.send_replace(identity);
    }

    /// Makes `current_session` fail until `clear_failure` is called.
    pub fn fail_with(&self, error: AuthError) {
        *lock(&self.failure) = Some(error);
    }

    pub fn clear_failure(&self) {
        lock(&self.failure).take();
    }

    /// Delays every `current_session` call.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *lock(&self.delay) = delay;
    }

    async fn start_session(&self, identity: Identity) {
        let token = format!("mem-{}", Uuid::new_v4());
        self.state
            .tokens
            .write()
            .await
            .insert(token.clone(), identity.clone());
        *lock(&self.token) = Some(token);
        self.set_session(Some(identity));
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn current_session(&self) -> Result<Option<Identity>, AuthError> {
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = lock(&self.failure).clone() {
            return Err(error);
        }
        Ok(self.session.borrow().clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.session.subscribe()
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let identity = {
            let accounts = self.state.accounts.read().await;
            match accounts.get(&credentials.email) {
                Some(account) if account.password == *credentials.password.expose_secret() => {
                    account.identity.clone()
                }
                _ => return Err(AuthError::InvalidCredentials),
            }
        };
        self.start_session(identity.clone()).await;
        Ok(identity)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpResult, AuthError> {
        let identity = {
            let mut accounts = self.state.accounts.write().await;
            if accounts.contains_key(&credentials.email) {
                return Err(AuthError::SignUpRejected(
                    "User already registered".to_string(),
                ));
            }
            let user_id = UserId::new(Uuid::new_v4().to_string())
                .map_err(|e| AuthError::SignUpRejected(e.to_string()))?;
            let identity = Identity::new(user_id).with_email(credentials.email.clone());
            accounts.insert(
                credentials.email.clone(),
                Account {
                    password: credentials.password.expose_secret().clone(),
                    identity: identity.clone(),
                },
            );
            identity
        };

        if !self.state.auto_confirm {
            return Ok(SignUpResult { identity: None });
        }
        self.start_session(identity.clone()).await;
        Ok(SignUpResult {
            identity: Some(identity),
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = lock(&self.token).take();
        if let Some(token) = token {
            self.state.tokens.write().await.remove(&token);
        }
        self.set_session(None);
        Ok(())
    }

    fn access_token(&self) -> Option<Secret<String>> {
        lock(&self.token).clone().map(Secret::new)
    }
}
