//! Supabase access-token validation.
//!
//! Supabase signs access tokens with the project's JWT secret (HS256). The
//! validator checks:
//!
//! - **Signature**: HMAC with the configured secret
//! - **Audience (aud)**: must contain `authenticated`
//! - **Expiry (exp)**: must be in the future
//!
//! No network round trip is needed, so validation never reports
//! `ServiceUnavailable`.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, Identity, UserId};
use crate::ports::SessionValidator;

use super::session_store::UserMetadata;

/// Audience Supabase puts on tokens of signed-in users.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

#[derive(Debug, Deserialize)]
struct SupabaseClaims {
    sub: String,

    #[serde(default)]
    aud: Audience,

    #[allow(dead_code)]
    exp: i64,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
enum Audience {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    fn contains(&self, expected: &str) -> bool {
        match self {
            Audience::None => false,
            Audience::Single(s) => s == expected,
            Audience::Multiple(v) => v.iter().any(|s| s == expected),
        }
    }
}

pub struct SupabaseJwtValidator {
    secret: Secret<String>,
    audience: String,
}

impl SupabaseJwtValidator {
    pub fn new(secret: Secret<String>) -> Self {
        Self {
            secret,
            audience: AUTHENTICATED_AUDIENCE.to_string(),
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    fn decode_claims(&self, token: &str) -> Result<SupabaseClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);

        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        decode::<SupabaseClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidAudience => {
                        tracing::warn!("Invalid audience in token");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::warn!("Token validation failed: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })
    }
}

#[async_trait]
impl SessionValidator for SupabaseJwtValidator {
    async fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.decode_claims(token)?;

        if !claims.aud.contains(&self.audience) {
            tracing::warn!("Audience mismatch: expected '{}', got '{:?}'", self.audience, claims.aud);
            return Err(AuthError::InvalidToken);
        }

        let user_id = UserId::new(&claims.sub).map_err(|_| {
            tracing::warn!("Invalid user ID in token: {}", claims.sub);
            AuthError::InvalidToken
        })?;

        let mut identity = Identity::new(user_id);
        if let Some(email) = claims.email {
            identity = identity.with_email(email);
        }
        if let Some(name) = claims.user_metadata.display_name() {
            identity = identity.with_display_name(name);
        }
        Ok(identity)
    }
}

impl std::fmt::Debug for SupabaseJwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseJwtValidator")
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";

    fn validator() -> SupabaseJwtValidator {
        SupabaseJwtValidator::new(Secret::new(SECRET.to_string()))
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn token(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn valid_token_yields_identity() {
        let jwt = token(
            json!({
                "sub": "8f0c",
                "aud": "authenticated",
                "exp": now() + 3600,
                "email": "rana@example.com",
                "user_metadata": {"full_name": "Rana Aziz"}
            }),
            SECRET,
        );

        let identity = validator().validate(&jwt).await.unwrap();

        assert_eq!(identity.user_id.as_str(), "8f0c");
        assert_eq!(identity.email.as_deref(), Some("rana@example.com"));
        assert_eq!(identity.display_name.as_deref(), Some("Rana Aziz"));
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let jwt = token(
            json!({"sub": "8f0c", "aud": "authenticated", "exp": now() - 3600}),
            SECRET,
        );

        assert_eq!(validator().validate(&jwt).await, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid() {
        let jwt = token(
            json!({"sub": "8f0c", "aud": "authenticated", "exp": now() + 3600}),
            "another-secret-that-is-also-long-enough-to-use",
        );

        assert_eq!(validator().validate(&jwt).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn anon_audience_is_invalid() {
        let jwt = token(
            json!({"sub": "8f0c", "aud": "anon", "exp": now() + 3600}),
            SECRET,
        );

        assert_eq!(validator().validate(&jwt).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        assert_eq!(
            validator().validate("not-a-jwt").await,
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn audience_array_contains() {
        let aud = Audience::Multiple(vec!["anon".to_string(), "authenticated".to_string()]);
        assert!(aud.contains("authenticated"));
        assert!(!Audience::None.contains("authenticated"));
    }
}
