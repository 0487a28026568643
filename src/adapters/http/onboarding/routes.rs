//! Axum routes for the auth and onboarding endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    complete_onboarding, complete_profile, get_destination, get_profile, register, sign_in,
    submit_survey, OnboardingAppState,
};

/// Routes mounted at `/api/auth`. No token needed.
pub fn auth_routes() -> Router<OnboardingAppState> {
    Router::new()
        .route("/register", post(register))
        .route("/sign-in", post(sign_in))
}

/// Routes mounted at `/api/onboarding`.
///
/// `/destination` also serves visitors; the rest require a session.
pub fn onboarding_routes() -> Router<OnboardingAppState> {
    Router::new()
        .route("/destination", get(get_destination))
        .route("/profile", get(get_profile))
        .route("/complete", post(complete_onboarding))
        .route("/complete-profile", post(complete_profile))
        .route("/survey", post(submit_survey))
}

pub fn onboarding_router() -> Router<OnboardingAppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/onboarding", onboarding_routes())
}
