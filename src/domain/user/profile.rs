//! Profile record and the write models used to create and update it.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::foundation::{Identity, StateMachine, Timestamp, UserId};

use super::registration::PendingRegistration;
use super::{BirthPlace, DeliveryType, Gender, PregnancyInfo, SurveyStatus};

/// Application role stored on the profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

/// Maps a JSON `null` to the type's default. PostgREST returns nulls for
/// text columns that were never filled in.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The single onboarding/survey record of an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Equals the identity's user id. Immutable.
    pub id: UserId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub origin_city: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: UserRole,
    #[serde(default, deserialize_with = "null_as_default")]
    form_completed: bool,
    #[serde(default)]
    pub is_first_pregnancy: Option<bool>,
    #[serde(default)]
    pub living_children_count: Option<u32>,
    #[serde(default)]
    pub delivery_type: Option<DeliveryType>,
    #[serde(default)]
    pub birth_place: Option<BirthPlace>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Profile {
    /// Materializes an inserted row, as a repository would return it.
    pub fn from_new(new: NewProfile, created_at: Timestamp) -> Self {
        Self {
            id: new.id,
            first_name: new.first_name,
            last_name: new.last_name,
            age: new.age,
            gender: new.gender,
            origin_city: new.origin_city,
            role: new.role,
            form_completed: new.form_completed,
            is_first_pregnancy: None,
            living_children_count: Some(new.living_children_count),
            delivery_type: None,
            birth_place: None,
            created_at: Some(created_at),
            updated_at: Some(created_at),
        }
    }

    pub fn survey_status(&self) -> SurveyStatus {
        SurveyStatus::from_completed(self.form_completed)
    }

    pub fn is_form_completed(&self) -> bool {
        self.form_completed
    }

    /// Display name shown next to non-anonymous posts.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Applies a partial update in place.
    ///
    /// `form_completed` can only move from false to true.
    pub fn apply(&mut self, update: &ProfileUpdate, updated_at: Timestamp) {
        if let Some(first_name) = &update.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(age) = update.age {
            self.age = Some(age);
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(origin_city) = &update.origin_city {
            self.origin_city = Some(origin_city.clone());
        }
        if let Some(first) = update.is_first_pregnancy {
            self.is_first_pregnancy = Some(first);
        }
        if let Some(count) = update.living_children_count {
            self.living_children_count = Some(count);
        }
        if let Some(delivery) = update.delivery_type {
            self.delivery_type = Some(delivery);
        }
        if let Some(place) = update.birth_place {
            self.birth_place = Some(place);
        }
        if update.mark_form_completed {
            if let Ok(status) = self.survey_status().transition_to(SurveyStatus::Completed) {
                self.form_completed = status.is_completed();
            }
        }
        self.updated_at = Some(updated_at);
    }
}

/// Splits a federated display name into first and last name at the first
/// whitespace run.
pub fn split_display_name(name: &str) -> (String, String) {
    let trimmed = name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

/// Insert model for a profile row.
///
/// `form_completed` is derived from the gender and cannot be set by callers:
/// non-female profiles are created complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<u8>,
    pub gender: Gender,
    pub origin_city: Option<String>,
    pub role: UserRole,
    form_completed: bool,
    living_children_count: u32,
}

impl NewProfile {
    /// Builds the minimal profile for a freshly authenticated identity.
    ///
    /// Staged registration data wins over federated metadata. Without
    /// either, names are empty and gender is `Unset`.
    pub fn for_identity(identity: &Identity, staged: Option<&PendingRegistration>) -> Self {
        let (first_name, last_name, age, gender, origin_city) = match staged {
            Some(pending) => (
                pending.first_name.clone(),
                pending.last_name.clone(),
                pending.age,
                pending.gender,
                pending.origin_city.clone(),
            ),
            None => {
                let (first, last) = identity
                    .display_name
                    .as_deref()
                    .map(split_display_name)
                    .unwrap_or_default();
                (first, last, None, Gender::Unset, None)
            }
        };

        Self {
            id: identity.user_id.clone(),
            first_name,
            last_name,
            age,
            gender,
            origin_city,
            role: UserRole::User,
            form_completed: SurveyStatus::initial_for(gender).is_completed(),
            living_children_count: 0,
        }
    }

    /// Replaces the gender, re-deriving the completion flag.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self.form_completed = SurveyStatus::initial_for(gender).is_completed();
        self
    }

    pub fn form_completed(&self) -> bool {
        self.form_completed
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Partial update of a profile row. Unset fields are left untouched.
///
/// There is no way to express "set form_completed to false".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_first_pregnancy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub living_children_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<DeliveryType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<BirthPlace>,
    #[serde(rename = "form_completed", skip_serializing_if = "is_false")]
    pub mark_form_completed: bool,
}

impl ProfileUpdate {
    /// Merges staged registration data into an update for an existing,
    /// incomplete profile.
    pub fn from_pending(pending: &PendingRegistration) -> Self {
        Self {
            first_name: Some(pending.first_name.clone()),
            last_name: Some(pending.last_name.clone()),
            age: pending.age,
            gender: Some(pending.gender),
            origin_city: pending.origin_city.clone(),
            mark_form_completed: !pending.gender.requires_survey(),
            ..Default::default()
        }
    }

    /// Gender chosen on the complete-profile screen.
    pub fn gender_choice(gender: Gender) -> Self {
        Self {
            gender: Some(gender),
            mark_form_completed: !gender.requires_survey(),
            ..Default::default()
        }
    }

    /// Pregnancy details from the survey; finishing the survey completes the
    /// profile.
    pub fn survey_completion(info: &PregnancyInfo) -> Self {
        Self {
            is_first_pregnancy: Some(info.is_first_pregnancy),
            living_children_count: Some(info.living_children_count),
            delivery_type: Some(info.delivery_type),
            birth_place: Some(info.birth_place),
            mark_form_completed: true,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
