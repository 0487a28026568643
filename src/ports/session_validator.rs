//! Session validation port for access-token validation.
//!
//! Used server side: the HTTP middleware hands the bearer token to a
//! `SessionValidator` and gets back the identity it belongs to.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, Identity};

/// Validates access tokens and extracts the identity.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidToken` for malformed or badly signed tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<Identity, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use std::collections::HashMap;
    use std::sync::RwLock;

    struct TestSessionValidator {
        tokens: RwLock<HashMap<String, Identity>>,
    }

    impl TestSessionValidator {
        fn new() -> Self {
            Self {
                tokens: RwLock::new(HashMap::new()),
            }
        }

        fn add_token(&self, token: &str, identity: Identity) {
            self.tokens
                .write()
                .unwrap()
                .insert(token.to_string(), identity);
        }
    }

    #[async_trait]
    impl SessionValidator for TestSessionValidator {
        async fn validate(&self, token: &str) -> Result<Identity, AuthError> {
            self.tokens
                .read()
                .unwrap()
                .get(token)
                .cloned()
                .ok_or(AuthError::InvalidToken)
        }
    }

    #[tokio::test]
    async fn validator_returns_identity_for_known_token() {
        let validator = TestSessionValidator::new();
        let identity = Identity::new(UserId::new("user-9").unwrap());
        validator.add_token("good", identity.clone());

        assert_eq!(validator.validate("good").await.unwrap(), identity);
        assert_eq!(
            validator.validate("bad").await.unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn validator_is_object_safe() {
        fn _accepts_dyn(_validator: &dyn SessionValidator) {}
    }
}
