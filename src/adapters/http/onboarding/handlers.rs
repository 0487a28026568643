//! HTTP handlers for registration, sign-in and the onboarding steps.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use secrecy::ExposeSecret;

use crate::application::handlers::onboarding::{
    CompleteProfileCommand, CompleteProfileHandler, ProfileCompletionWorkflow, RegisterHandler,
    ResolveDestinationHandler, SignInHandler, SubmitSurveyHandler,
};
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use crate::domain::onboarding::Screen;
use crate::domain::user::{Gender, RegistrationForm, RegistrationSlot, SurveySubmission};
use crate::ports::{ProfileRepository, SessionStore, SessionStoreFactory, SurveyRepository};

use super::super::error::ApiError;
use super::super::middleware::{OptionalAuth, RequireAuth};
use super::dto::{
    CompleteOnboardingRequest, CompleteOnboardingResponse, CompleteProfileRequest,
    DestinationQuery, DestinationResponse, ProfileResponse, RegisterResponse, SessionResponse,
    SignInRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Dependencies of the onboarding endpoints.
#[derive(Clone)]
pub struct OnboardingAppState {
    /// Opens a fresh auth session per register/sign-in request.
    pub auth: Arc<dyn SessionStoreFactory>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub surveys: Arc<dyn SurveyRepository>,
    /// Shared so concurrent completion requests are serialized.
    pub workflow: Arc<ProfileCompletionWorkflow>,
    pub fetch_timeout: Duration,
}

impl OnboardingAppState {
    pub fn new(
        auth: Arc<dyn SessionStoreFactory>,
        profiles: Arc<dyn ProfileRepository>,
        surveys: Arc<dyn SurveyRepository>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            workflow: Arc::new(ProfileCompletionWorkflow::new(profiles.clone())),
            auth,
            profiles,
            surveys,
            fetch_timeout,
        }
    }

    pub fn resolve_handler(&self) -> ResolveDestinationHandler {
        ResolveDestinationHandler::new(self.profiles.clone(), self.fetch_timeout)
    }

    pub fn complete_profile_handler(&self) -> CompleteProfileHandler {
        CompleteProfileHandler::new(self.profiles.clone())
    }

    pub fn submit_survey_handler(&self) -> SubmitSurveyHandler {
        SubmitSurveyHandler::new(self.profiles.clone(), self.surveys.clone())
    }
}

fn access_token(store: &dyn SessionStore) -> Option<String> {
    store
        .access_token()
        .map(|token| token.expose_secret().clone())
}

// ════════════════════════════════════════════════════════════════════════════════
// Auth
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/auth/register
pub async fn register(
    State(state): State<OnboardingAppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.auth.open();
    let slot = RegistrationSlot::new();

    let outcome = RegisterHandler::new(store.clone())
        .handle(form, &slot)
        .await?;
    let token = access_token(store.as_ref());

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse::new(outcome, token)),
    ))
}

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<OnboardingAppState>,
    Json(request): Json<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.auth.open();

    let identity = SignInHandler::new(store.clone())
        .handle(&request.email, &request.password)
        .await?;
    let token = access_token(store.as_ref()).ok_or_else(|| {
        DomainError::new(ErrorCode::InternalError, "Sign-in returned no session")
    })?;

    Ok(Json(SessionResponse::new(&identity, token)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Onboarding
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/onboarding/destination?path=/posts
///
/// Without `path`, returns where the caller belongs. With `path`, also says
/// whether that screen may be shown and where to redirect otherwise.
pub async fn get_destination(
    State(state): State<OnboardingAppState>,
    OptionalAuth(identity): OptionalAuth,
    Query(query): Query<DestinationQuery>,
) -> Result<Response, ApiError> {
    let handler = state.resolve_handler();

    let Some(path) = query.path else {
        let destination = handler.destination(identity.as_ref()).await?;
        return Ok(Json(DestinationResponse::from(destination)).into_response());
    };

    let screen = Screen::from_path(&path).ok_or_else(|| {
        DomainError::from(ValidationError::invalid_format("path", "unknown screen"))
    })?;
    let decision = handler.handle(identity.as_ref(), screen).await?;
    Ok(Json(decision).into_response())
}

/// GET /api/onboarding/profile
pub async fn get_profile(
    State(state): State<OnboardingAppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .profiles
        .find_by_id(&identity.user_id)
        .await?
        .ok_or_else(|| DomainError::new(ErrorCode::ProfileNotFound, "Profile not found"))?;

    Ok(Json(ProfileResponse::from(&profile)))
}

/// POST /api/onboarding/complete - runs the profile completion workflow.
pub async fn complete_onboarding(
    State(state): State<OnboardingAppState>,
    RequireAuth(identity): RequireAuth,
    body: Option<Json<CompleteOnboardingRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let pending = body.and_then(|Json(request)| request.pending_registration);
    let slot = RegistrationSlot::with_pending(pending);

    let outcome = state.workflow.run(&identity, &slot).await?;

    Ok(Json(CompleteOnboardingResponse {
        profile: ProfileResponse::from(&outcome.profile),
        next: outcome.destination.into(),
    }))
}

/// POST /api/onboarding/complete-profile
pub async fn complete_profile(
    State(state): State<OnboardingAppState>,
    RequireAuth(identity): RequireAuth,
    Json(request): Json<CompleteProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let gender: Gender = request.gender.parse().map_err(DomainError::from)?;

    let destination = state
        .complete_profile_handler()
        .handle(&identity, CompleteProfileCommand { gender })
        .await?;

    Ok(Json(DestinationResponse::from(destination)))
}

/// POST /api/onboarding/survey
pub async fn submit_survey(
    State(state): State<OnboardingAppState>,
    RequireAuth(identity): RequireAuth,
    Json(submission): Json<SurveySubmission>,
) -> Result<impl IntoResponse, ApiError> {
    let destination = state
        .submit_survey_handler()
        .handle(&identity, submission)
        .await?;

    Ok((StatusCode::CREATED, Json(DestinationResponse::from(destination))))
}
