//! HTTP adapter for registration and onboarding.
//!
//! - `POST /api/auth/register` - validate, stage and sign up
//! - `POST /api/auth/sign-in` - password sign-in
//! - `GET /api/onboarding/destination` - where the caller belongs
//! - `GET /api/onboarding/profile` - the caller's profile
//! - `POST /api/onboarding/complete` - create or repair the profile
//! - `POST /api/onboarding/complete-profile` - record the gender
//! - `POST /api/onboarding/survey` - submit the medical survey

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::OnboardingAppState;
pub use routes::onboarding_router;
