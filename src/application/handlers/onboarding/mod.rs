//! Onboarding application handlers.
//!
//! The route guard, the profile completion workflow and the handlers behind
//! the registration, sign-in, complete-profile and survey screens.

mod auth_callback;
mod complete_profile;
mod guard;
mod register;
mod resolve_destination;
mod sign_in;
mod submit_survey;
mod workflow;

pub use auth_callback::AuthCallbackHandler;
pub use complete_profile::{CompleteProfileCommand, CompleteProfileHandler};
pub use guard::{
    FetchStage, GuardConfig, GuardFailure, GuardStatus, GuardWatch, RouteGuard,
    DEFAULT_FETCH_TIMEOUT,
};
pub use register::{RegisterHandler, SignUpOutcome};
pub use resolve_destination::{GuardDecision, ResolveDestinationHandler};
pub use sign_in::{SignInHandler, SignOutHandler};
pub use submit_survey::SubmitSurveyHandler;
pub use workflow::{CompletionOutcome, ProfileCompletionWorkflow};
