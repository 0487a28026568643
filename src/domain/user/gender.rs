//! Gender value and the survey status state machine.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Gender as stored on the profile row.
///
/// The backend column is a nullable enum (`male | female | other`); a null
/// column maps to `Unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    Unset,
}

impl Gender {
    /// Only female profiles are gated by the medical survey. `Other` and
    /// `Unset` are exempt, the same as `Male`.
    pub fn requires_survey(&self) -> bool {
        matches!(self, Gender::Female)
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Gender::Unset)
    }

    fn as_wire(&self) -> Option<&'static str> {
        match self {
            Gender::Male => Some("male"),
            Gender::Female => Some("female"),
            Gender::Other => Some("other"),
            Gender::Unset => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire().unwrap_or("unset"))
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    /// Parses a form value. An empty string means "not given".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            "" | "unset" => Ok(Gender::Unset),
            other => Err(ValidationError::invalid_format(
                "gender",
                format!("unknown gender '{}'", other),
            )),
        }
    }
}

impl Serialize for Gender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_wire() {
            Some(value) => serializer.serialize_str(value),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Gender::Unset),
            Some(raw) => raw.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Whether the onboarding survey gate has been passed.
///
/// The only legal transition is `Pending -> Completed`; once completed the
/// profile is never sent back to the survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyStatus {
    Pending,
    Completed,
}

impl SurveyStatus {
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            SurveyStatus::Completed
        } else {
            SurveyStatus::Pending
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SurveyStatus::Completed)
    }

    /// Status a freshly created profile starts in.
    pub fn initial_for(gender: Gender) -> Self {
        Self::from_completed(!gender.requires_survey())
    }
}

impl StateMachine for SurveyStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!((self, target), (SurveyStatus::Pending, SurveyStatus::Completed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            SurveyStatus::Pending => vec![SurveyStatus::Completed],
            SurveyStatus::Completed => vec![],
        }
    }
}
