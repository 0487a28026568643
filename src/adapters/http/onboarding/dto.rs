//! Request and response bodies for the onboarding endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::onboarding::SignUpOutcome;
use crate::domain::foundation::Identity;
use crate::domain::onboarding::Destination;
use crate::domain::user::{PendingRegistration, Profile};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DestinationQuery {
    /// Path of the screen about to be shown. Omitted: just resolve.
    #[serde(default)]
    pub path: Option<String>,
}

/// Body of `POST /api/onboarding/complete`.
///
/// Clients that registered with email confirmation carry the staged data
/// across the round trip and send it back here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteOnboardingRequest {
    #[serde(default)]
    pub pending_registration: Option<PendingRegistration>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteProfileRequest {
    pub gender: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub access_token: String,
}

impl SessionResponse {
    pub fn new(identity: &Identity, access_token: String) -> Self {
        Self {
            user_id: identity.user_id.to_string(),
            email: identity.email.clone(),
            access_token,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub email_confirmation_required: bool,
    /// Present when the backend signed the user in right away.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionResponse>,
    /// Staged registration data, to be sent back on completion.
    pub pending_registration: PendingRegistration,
}

impl RegisterResponse {
    pub fn new(outcome: SignUpOutcome, access_token: Option<String>) -> Self {
        let session = match (&outcome.identity, access_token) {
            (Some(identity), Some(token)) => Some(SessionResponse::new(identity, token)),
            _ => None,
        };
        Self {
            email_confirmation_required: outcome.email_confirmation_required,
            session,
            pending_registration: outcome.staged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationResponse {
    pub destination: Destination,
    pub path: &'static str,
}

impl From<Destination> for DestinationResponse {
    fn from(destination: Destination) -> Self {
        Self {
            destination,
            path: destination.path(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_city: Option<String>,
    pub form_completed: bool,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            age: profile.age,
            gender: profile.gender.to_string(),
            origin_city: profile.origin_city.clone(),
            form_completed: profile.is_form_completed(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteOnboardingResponse {
    pub profile: ProfileResponse,
    #[serde(flatten)]
    pub next: DestinationResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::user::Gender;

    fn staged() -> PendingRegistration {
        PendingRegistration {
            first_name: "Rana".to_string(),
            last_name: "Aziz".to_string(),
            age: Some(29),
            gender: Gender::Female,
            origin_city: None,
        }
    }

    #[test]
    fn register_response_omits_session_when_confirmation_pending() {
        let outcome = SignUpOutcome {
            identity: None,
            email_confirmation_required: true,
            staged: staged(),
        };

        let json = serde_json::to_value(RegisterResponse::new(outcome, None)).unwrap();

        assert_eq!(json["email_confirmation_required"], true);
        assert!(json.get("session").is_none());
        assert_eq!(json["pending_registration"]["gender"], "female");
    }

    #[test]
    fn register_response_carries_session_token() {
        let identity = Identity::new(UserId::new("u1").unwrap());
        let outcome = SignUpOutcome {
            identity: Some(identity),
            email_confirmation_required: false,
            staged: staged(),
        };

        let json =
            serde_json::to_value(RegisterResponse::new(outcome, Some("tok".to_string()))).unwrap();

        assert_eq!(json["session"]["access_token"], "tok");
    }

    #[test]
    fn destination_response_includes_path() {
        let json = serde_json::to_value(DestinationResponse::from(Destination::Survey)).unwrap();
        assert_eq!(json["destination"], "survey");
        assert_eq!(json["path"], "/survey");
    }

    #[test]
    fn complete_request_accepts_empty_body() {
        let request: CompleteOnboardingRequest = serde_json::from_str("{}").unwrap();
        assert!(request.pending_registration.is_none());
    }
}
