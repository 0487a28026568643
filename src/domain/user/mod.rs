//! User module - profile record, registration staging and survey data.
//!
//! The profile is the single persisted record of an identity's onboarding
//! state. Its `form_completed` flag is guarded by the `SurveyStatus` state
//! machine so it can never be switched back off.

mod gender;
mod profile;
mod registration;
mod survey;

pub use gender::{Gender, SurveyStatus};
pub use profile::{split_display_name, NewProfile, Profile, ProfileUpdate, UserRole};
pub use registration::{
    PendingRegistration, RegistrationForm, RegistrationSlot, MAX_AGE, MIN_AGE, MIN_PASSWORD_LEN,
};
pub use survey::{
    BirthPlace, DeliveryType, MedicalSurvey, PregnancyInfo, SurveyAnswers, SurveySubmission,
};
