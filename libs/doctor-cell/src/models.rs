use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

/// A clinician who can be booked. Maintained by clinic staff outside this
/// service; the booking flow only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub title: String,
    pub specialization: Vec<String>,
    pub experience: Option<i32>,
    pub bio: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub consultation_fee: Option<f64>,
    pub rating: Option<f32>,
    pub is_active: bool,
}

impl Doctor {
    /// Name shown to patients, e.g. in confirmation emails.
    pub fn display_name(&self) -> &str {
        &self.name
    }

    pub fn has_specialization(&self, specialization: &str) -> bool {
        self.specialization
            .iter()
            .any(|s| s.eq_ignore_ascii_case(specialization))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSearchQuery {
    pub specialization: Option<String>,
    /// Defaults to active doctors only.
    pub is_active: Option<bool>,
}

impl DoctorSearchQuery {
    pub fn active_only(&self) -> bool {
        self.is_active.unwrap_or(true)
    }

    pub fn matches(&self, doctor: &Doctor) -> bool {
        doctor.is_active == self.active_only()
            && self
                .specialization
                .as_deref()
                .map_or(true, |s| doctor.has_specialization(s))
    }
}

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Database error: {0}")]
    Storage(#[from] DatabaseError),
}

impl From<DoctorError> for AppError {
    fn from(error: DoctorError) -> Self {
        match error {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::Storage(e) => {
                tracing::error!("Doctor lookup failed: {}", e);
                AppError::Database("Failed to fetch doctors".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(is_active: bool) -> Doctor {
        Doctor {
            id: "1".to_string(),
            name: "Dr. Sarah Johnson".to_string(),
            title: "MD, FACS".to_string(),
            specialization: vec!["General ENT".to_string(), "Pediatric ENT".to_string()],
            experience: Some(15),
            bio: None,
            image: None,
            languages: vec!["English".to_string()],
            consultation_fee: Some(150.0),
            rating: Some(4.9),
            is_active,
        }
    }

    #[test]
    fn search_defaults_to_active_doctors() {
        let query = DoctorSearchQuery::default();
        assert!(query.matches(&doctor(true)));
        assert!(!query.matches(&doctor(false)));
    }

    #[test]
    fn specialization_filter_is_case_insensitive() {
        let query = DoctorSearchQuery {
            specialization: Some("pediatric ent".to_string()),
            is_active: None,
        };
        assert!(query.matches(&doctor(true)));

        let query = DoctorSearchQuery {
            specialization: Some("Rhinology".to_string()),
            is_active: None,
        };
        assert!(!query.matches(&doctor(true)));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(doctor(true)).unwrap();
        assert_eq!(json["isActive"], true);
        assert_eq!(json["consultationFee"], 150.0);
    }
}
