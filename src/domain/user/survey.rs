//! Medical survey answers and pregnancy information.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId, ValidationError};

/// How the most recent delivery happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Natural,
    Cesarean,
    Both,
}

/// Where the delivery took place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthPlace {
    PublicHospital,
    PrivateHospital,
    Clinic,
    Other,
}

/// Pregnancy details stored on the profile itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PregnancyInfo {
    pub is_first_pregnancy: bool,
    pub living_children_count: u32,
    pub delivery_type: DeliveryType,
    pub birth_place: BirthPlace,
}

/// Upper bound accepted for `living_children_count`.
const MAX_LIVING_CHILDREN: u32 = 30;

impl PregnancyInfo {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.living_children_count > MAX_LIVING_CHILDREN {
            return Err(ValidationError::out_of_range(
                "living_children_count",
                0,
                MAX_LIVING_CHILDREN as i32,
                self.living_children_count as i32,
            ));
        }
        if self.is_first_pregnancy && self.living_children_count > 1 {
            return Err(ValidationError::invalid_format(
                "living_children_count",
                "a first pregnancy cannot have more than one living child",
            ));
        }
        Ok(())
    }
}

/// Yes/no answers of the medical survey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswers {
    pub told_about_cynto: bool,
    pub gave_consent: bool,
    pub knew_why_cynto: bool,
    pub strong_contractions: bool,
    pub more_pain_than_expected: bool,
    pub asked_to_stop: bool,
    pub problems_after_delivery: bool,
    pub felt_respected: bool,
    pub too_much_cynto_used: bool,
}

/// Everything the survey screen submits in one go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySubmission {
    pub pregnancy: PregnancyInfo,
    pub answers: SurveyAnswers,
}

/// A row of the `medical_surveys` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalSurvey {
    pub user_id: UserId,
    #[serde(flatten)]
    pub answers: SurveyAnswers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl MedicalSurvey {
    pub fn new(user_id: UserId, answers: SurveyAnswers) -> Self {
        Self {
            user_id,
            answers,
            created_at: None,
        }
    }
}
