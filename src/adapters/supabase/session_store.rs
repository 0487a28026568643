//! GoTrue-backed session store.
//!
//! Signs in with the password grant, signs up, signs out, and keeps the
//! session's access token on the shared `SupabaseClient` so data requests run
//! as the signed-in user.

use async_trait::async_trait;
use reqwest::Method;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::foundation::{AuthError, Identity, UserId};
use crate::ports::{Credentials, SessionStore, SessionStoreFactory, SignUpResult};

use super::client::{SupabaseClient, SupabaseConfig, SupabaseError};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserMetadata {
    pub(crate) fn display_name(self) -> Option<String> {
        self.full_name
            .or(self.name)
            .filter(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

impl UserBody {
    fn into_identity(self) -> Result<Identity, AuthError> {
        let user_id = UserId::new(self.id).map_err(|_| AuthError::InvalidToken)?;
        let mut identity = Identity::new(user_id);
        if let Some(email) = self.email {
            identity = identity.with_email(email);
        }
        if let Some(name) = self.user_metadata.display_name() {
            identity = identity.with_display_name(name);
        }
        Ok(identity)
    }
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    access_token: String,
    user: UserBody,
}

/// Sign-up answers with a session when email confirmation is off, and with
/// the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpBody {
    Session(SessionBody),
    User(UserBody),
}

/// Session store for one client session.
pub struct SupabaseSessionStore {
    client: Arc<SupabaseClient>,
    identity: watch::Sender<Option<Identity>>,
}

impl SupabaseSessionStore {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        let (identity, _) = watch::channel(None);
        Self { client, identity }
    }

    /// Adopts an access token obtained elsewhere (e.g. an OAuth redirect) and
    /// resolves its user.
    pub async fn restore(&self, access_token: &str) -> Result<Identity, AuthError> {
        let request = self
            .client
            .auth(Method::GET, "user", Some(access_token))?;
        let user: UserBody = self.client.send_json(request).await?;
        let identity = user.into_identity()?;
        self.establish(Secret::new(access_token.to_string()), identity.clone());
        Ok(identity)
    }

    fn establish(&self, token: Secret<String>, identity: Identity) {
        self.client.set_session_token(Some(token));
        tracing::info!(user_id = %identity.user_id, "Session established");
        self.identity.send_replace(Some(identity));
    }

    fn clear(&self) {
        self.client.set_session_token(None);
        self.identity.send_replace(None);
    }

    fn credentials_body(credentials: &Credentials) -> serde_json::Value {
        serde_json::json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        })
    }
}

#[async_trait]
impl SessionStore for SupabaseSessionStore {
    async fn current_session(&self) -> Result<Option<Identity>, AuthError> {
        self.client.ensure_configured()?;
        Ok(self.identity.borrow().clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let request = self
            .client
            .auth(Method::POST, "token?grant_type=password", None)?
            .json(&Self::credentials_body(credentials));

        let session: SessionBody = match self.client.send_json(request).await {
            Ok(session) => session,
            Err(SupabaseError::Status { status, .. }) if (400..500).contains(&status) => {
                return Err(AuthError::InvalidCredentials)
            }
            Err(err) => return Err(err.into()),
        };

        let identity = session.user.into_identity()?;
        self.establish(Secret::new(session.access_token), identity.clone());
        Ok(identity)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpResult, AuthError> {
        let request = self
            .client
            .auth(Method::POST, "signup", None)?
            .json(&Self::credentials_body(credentials));

        match self.client.send_json::<SignUpBody>(request).await? {
            SignUpBody::Session(session) => {
                let identity = session.user.into_identity()?;
                self.establish(Secret::new(session.access_token), identity.clone());
                Ok(SignUpResult {
                    identity: Some(identity),
                })
            }
            SignUpBody::User(user) => {
                tracing::info!(user_id = %user.id, "Sign-up awaiting email confirmation");
                Ok(SignUpResult { identity: None })
            }
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self.client.session_token();
        self.clear();

        if let Some(token) = token {
            let result = match self
                .client
                .auth(Method::POST, "logout", Some(token.expose_secret()))
            {
                Ok(request) => self.client.send(request).await.map(|_| ()),
                Err(err) => Err(err),
            };
            if let Err(err) = result {
                tracing::warn!(error = %err, "Remote sign-out failed; local session cleared");
            }
        }
        Ok(())
    }

    fn access_token(&self) -> Option<Secret<String>> {
        self.client.session_token()
    }
}

/// Opens one Supabase session per client session. Each session gets its own
/// client so tokens never leak between callers.
pub struct SupabaseSessionFactory {
    config: SupabaseConfig,
    shared: Arc<SupabaseClient>,
}

impl SupabaseSessionFactory {
    pub fn new(config: SupabaseConfig) -> Result<Self, SupabaseError> {
        let shared = Arc::new(SupabaseClient::new(config.clone())?);
        Ok(Self { config, shared })
    }
}

impl SessionStoreFactory for SupabaseSessionFactory {
    fn open(&self) -> Arc<dyn SessionStore> {
        let client = match SupabaseClient::new(self.config.clone()) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                tracing::warn!(error = %err, "Falling back to shared Supabase client");
                self.shared.clone()
            }
        };
        Arc::new(SupabaseSessionStore::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SupabaseSessionStore {
        let client = SupabaseClient::new(SupabaseConfig::new("", "")).unwrap();
        SupabaseSessionStore::new(Arc::new(client))
    }

    #[test]
    fn user_body_prefers_full_name() {
        let user: UserBody = serde_json::from_str(
            r#"{"id":"u1","email":"a@b.c","user_metadata":{"full_name":"Rana Aziz","name":"rana"}}"#,
        )
        .unwrap();

        let identity = user.into_identity().unwrap();

        assert_eq!(identity.email.as_deref(), Some("a@b.c"));
        assert_eq!(identity.display_name.as_deref(), Some("Rana Aziz"));
    }

    #[test]
    fn sign_up_body_distinguishes_confirmation() {
        let pending: SignUpBody = serde_json::from_str(r#"{"id":"u1","email":"a@b.c"}"#).unwrap();
        assert!(matches!(pending, SignUpBody::User(_)));

        let session: SignUpBody = serde_json::from_str(
            r#"{"access_token":"t","token_type":"bearer","user":{"id":"u1"}}"#,
        )
        .unwrap();
        assert!(matches!(session, SignUpBody::Session(_)));
    }

    #[tokio::test]
    async fn unconfigured_store_reports_not_configured() {
        let store = store();

        assert_eq!(store.current_session().await, Err(AuthError::NotConfigured));
        assert_eq!(
            store
                .sign_in(&Credentials::new("a@b.c", "secret1"))
                .await
                .unwrap_err(),
            AuthError::NotConfigured
        );
    }

    #[tokio::test]
    async fn sign_out_without_session_clears_locally() {
        let store = store();
        let mut updates = store.subscribe();
        store.establish(
            Secret::new("t".to_string()),
            Identity::new(UserId::new("u1").unwrap()),
        );
        assert!(updates.borrow_and_update().is_some());

        store.sign_out().await.unwrap();

        assert!(store.access_token().is_none());
        assert!(updates.borrow_and_update().is_none());
    }
}
