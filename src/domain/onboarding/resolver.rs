//! The onboarding decision.

use crate::domain::user::{Gender, Profile};

use super::Destination;

/// Decides where a user belongs given their session and profile.
///
/// First match wins:
/// 1. no session: `Login`
/// 2. session without profile: `CompleteProfile`
/// 3. incomplete profile: `Survey` for female profiles, otherwise
///    `CompleteProfile`
/// 4. complete profile: `Posts`
pub fn resolve(has_session: bool, profile: Option<&Profile>) -> Destination {
    if !has_session {
        return Destination::Login;
    }
    match profile {
        None => Destination::CompleteProfile,
        Some(profile) if profile.is_form_completed() => Destination::Posts,
        Some(profile) if profile.gender == Gender::Female => Destination::Survey,
        Some(_) => Destination::CompleteProfile,
    }
}
