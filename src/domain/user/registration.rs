//! Registration form validation and the staged-registration slot.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

use crate::domain::foundation::ValidationError;

use super::Gender;

/// Minimum password length accepted by the auth backend.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Accepted age range on the registration form.
pub const MIN_AGE: u8 = 18;
pub const MAX_AGE: u8 = 100;

/// Registration fields captured before an identity exists, waiting to be
/// attached to the profile once the user is authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub origin_city: Option<String>,
}

/// Single slot holding staged registration data for one session context.
///
/// Written by the registration form, read and cleared by the profile
/// completion workflow. A slot belongs to exactly one client session and is
/// passed around explicitly.
#[derive(Debug, Default)]
pub struct RegistrationSlot {
    pending: Mutex<Option<PendingRegistration>>,
}

impl RegistrationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that already carries staged data, e.g. when the client sends
    /// it back with the completion request.
    pub fn with_pending(pending: Option<PendingRegistration>) -> Self {
        Self {
            pending: Mutex::new(pending),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<PendingRegistration>> {
        // The slot holds plain data; a poisoned lock still has a valid value.
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stages registration data, replacing anything staged earlier.
    pub fn stage(&self, pending: PendingRegistration) {
        *self.lock() = Some(pending);
    }

    /// Returns a copy of the staged data without consuming it.
    pub fn peek(&self) -> Option<PendingRegistration> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().take();
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }
}

/// Raw registration form as submitted by the user.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub age: Option<u16>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub origin_city: Option<String>,
}

impl RegistrationForm {
    /// Validates the form and extracts the data to stage.
    ///
    /// Runs before any network call; the user stays on the form on error.
    pub fn validate(&self) -> Result<PendingRegistration, ValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing @ symbol"));
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(ValidationError::invalid_format(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::mismatch("confirm_password", "password"));
        }

        let first_name = self.first_name.trim();
        if first_name.is_empty() {
            return Err(ValidationError::empty_field("first_name"));
        }
        let last_name = self.last_name.trim();
        if last_name.is_empty() {
            return Err(ValidationError::empty_field("last_name"));
        }

        let age = match self.age {
            None => None,
            Some(age) if (MIN_AGE as u16..=MAX_AGE as u16).contains(&age) => Some(age as u8),
            Some(age) => {
                return Err(ValidationError::out_of_range(
                    "age",
                    MIN_AGE as i32,
                    MAX_AGE as i32,
                    age as i32,
                ))
            }
        };

        let gender = match self.gender.as_deref() {
            Some(raw) => raw.parse::<Gender>()?,
            None => Gender::Unset,
        };
        if gender == Gender::Other {
            return Err(ValidationError::invalid_format(
                "gender",
                "registration accepts female or male",
            ));
        }

        let origin_city = self
            .origin_city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
            .map(str::to_string);

        Ok(PendingRegistration {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age,
            gender,
            origin_city,
        })
    }
}
