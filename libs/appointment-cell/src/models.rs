// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use shared_database::DatabaseError;
use shared_models::error::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub patient_age: u32,
    pub doctor_id: String,
    pub appointment_date: NaiveDate,
    /// One of the clinic's slot labels, e.g. `"9:30 AM"`.
    pub appointment_time: String,
    pub reason: String,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub is_first_visit: bool,
    pub emergency_contact: Option<EmergencyContact>,
    pub insurance: Option<InsuranceInfo>,
    pub preferred_language: String,
    pub status: AppointmentStatus,
    pub reference_number: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Uniqueness rule for the (doctor, date, time) triple. Wider than the
    /// availability view, which ignores completed visits.
    pub fn occupies_slot(&self, doctor_id: &str, date: NaiveDate, time: &str) -> bool {
        self.status != AppointmentStatus::Cancelled
            && self.doctor_id == doctor_id
            && self.appointment_date == date
            && self.appointment_time == time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Status given to appointments created through the booking form.
    pub const ON_BOOKING: AppointmentStatus = AppointmentStatus::Confirmed;

    /// Statuses that make a slot show as taken in availability results.
    pub const SLOT_HOLDING: [AppointmentStatus; 2] =
        [AppointmentStatus::Pending, AppointmentStatus::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppointmentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(AppointmentError::ValidationError(format!("Unknown status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceInfo {
    pub provider: Option<String>,
    pub policy_number: Option<String>,
}

/// An appointment as returned to callers, with the doctor's name resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor_name: Option<String>,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Booking form body. Every field is optional at the wire level so missing
/// input can be reported by name instead of as a generic parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookAppointmentRequest {
    pub patient_name: Option<String>,
    pub patient_email: Option<String>,
    pub patient_phone: Option<String>,
    /// Accepted as a JSON number or a numeric string.
    pub patient_age: Option<Value>,
    pub doctor_id: Option<String>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub reason: Option<String>,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub is_first_visit: Option<bool>,
    pub emergency_contact: Option<EmergencyContact>,
    pub insurance: Option<InsuranceInfo>,
    pub preferred_language: Option<String>,
}

/// A booking that passed input validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub patient_age: u32,
    pub doctor_id: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub reason: String,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub is_first_visit: bool,
    pub emergency_contact: Option<EmergencyContact>,
    pub insurance: Option<InsuranceInfo>,
    pub preferred_language: String,
}

impl NewAppointment {
    pub fn into_appointment(self, reference_number: String, now: DateTime<Utc>) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_name: self.patient_name,
            patient_email: self.patient_email,
            patient_phone: self.patient_phone,
            patient_age: self.patient_age,
            doctor_id: self.doctor_id,
            appointment_date: self.appointment_date,
            appointment_time: self.appointment_time,
            reason: self.reason,
            symptoms: self.symptoms,
            notes: self.notes,
            is_first_visit: self.is_first_visit,
            emergency_contact: self.emergency_contact,
            insurance: self.insurance,
            preferred_language: self.preferred_language,
            status: AppointmentStatus::ON_BOOKING,
            reference_number: Some(reference_number),
            cancelled_at: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub doctor_id: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time: String,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub available_slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentQuery {
    pub doctor_id: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

// ==============================================================================
// STORE MODELS
// ==============================================================================

/// Store-side selection. Empty `statuses` means any status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub doctor_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub statuses: Vec<AppointmentStatus>,
}

impl AppointmentFilter {
    /// Appointments that take a doctor's slot on the given day.
    pub fn slot_holders(doctor_id: &str, date: NaiveDate) -> Self {
        Self {
            doctor_id: Some(doctor_id.to_string()),
            date: Some(date),
            statuses: AppointmentStatus::SLOT_HOLDING.to_vec(),
        }
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.doctor_id.as_deref().map_or(true, |id| appointment.doctor_id == id)
            && self.date.map_or(true, |date| appointment.appointment_date == date)
            && (self.statuses.is_empty() || self.statuses.contains(&appointment.status))
    }
}

/// Fields written by a status transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl StatusChange {
    pub fn apply_to(&self, appointment: &mut Appointment) {
        appointment.status = self.status;
        if let Some(notes) = &self.notes {
            appointment.notes = Some(notes.clone());
        }
        if self.cancelled_at.is_some() {
            appointment.cancelled_at = self.cancelled_at;
        }
        if self.updated_by.is_some() {
            appointment.updated_by = self.updated_by.clone();
        }
        appointment.updated_at = self.updated_at;
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("{0}")]
    ValidationError(String),

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment not found")]
    NotFound,

    #[error("This time slot is already booked")]
    SlotAlreadyBooked,

    #[error("Cannot change appointment status from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Database error: {0}")]
    Storage(#[from] DatabaseError),
}

impl From<AppointmentError> for AppError {
    fn from(error: AppointmentError) -> Self {
        match error {
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::DoctorNotFound | AppointmentError::NotFound => {
                AppError::NotFound(error.to_string())
            }
            AppointmentError::SlotAlreadyBooked => AppError::Conflict(error.to_string()),
            AppointmentError::InvalidStatusTransition { .. } => AppError::BadRequest(error.to_string()),
            AppointmentError::Storage(e) => {
                tracing::error!("Appointment store failure: {}", e);
                AppError::Database("Unexpected storage failure".to_string())
            }
        }
    }
}

/// Trims `value` and fails with `"<field> is required"` when nothing is left.
pub(crate) fn require_text(value: Option<String>, field: &str) -> Result<String, AppointmentError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppointmentError::ValidationError(format!("{} is required", field)))
}
