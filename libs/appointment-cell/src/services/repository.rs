// libs/appointment-cell/src/services/repository.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{
    Appointment, AppointmentFilter, AppointmentStatus, EmergencyContact, InsuranceInfo, StatusChange,
};

/// Name of the partial unique index guarding a doctor's slot.
pub const ACTIVE_SLOT_CONSTRAINT: &str = "appointments_active_slot_idx";

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError>;

    /// Appointments matching the filter, in no guaranteed order.
    async fn find(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, DatabaseError>;

    /// Any non-cancelled appointment occupying the slot.
    async fn find_slot_holder(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        time: &str,
    ) -> Result<Option<Appointment>, DatabaseError>;

    /// Persists a new appointment. Fails with [`DatabaseError::UniqueViolation`]
    /// when a non-cancelled appointment already holds the same slot, no matter
    /// how many inserts race.
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, DatabaseError>;

    /// Applies `change` only while the stored status still equals `expected`.
    /// Returns `None` when the appointment is missing or has moved on.
    async fn update_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        change: StatusChange,
    ) -> Result<Option<Appointment>, DatabaseError>;
}

// ==============================================================================
// POSTGREST IMPLEMENTATION
// ==============================================================================

/// Row shape of the `appointments` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRow {
    pub id: Uuid,
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
    #[serde(default)]
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

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        Appointment {
            id: row.id,
            patient_name: row.patient_name,
            patient_email: row.patient_email,
            patient_phone: row.patient_phone,
            patient_age: row.patient_age,
            doctor_id: row.doctor_id,
            appointment_date: row.appointment_date,
            appointment_time: row.appointment_time,
            reason: row.reason,
            symptoms: row.symptoms,
            notes: row.notes,
            is_first_visit: row.is_first_visit,
            emergency_contact: row.emergency_contact,
            insurance: row.insurance,
            preferred_language: row.preferred_language,
            status: row.status,
            reference_number: row.reference_number,
            cancelled_at: row.cancelled_at,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<Appointment> for AppointmentRow {
    fn from(appointment: Appointment) -> Self {
        AppointmentRow {
            id: appointment.id,
            patient_name: appointment.patient_name,
            patient_email: appointment.patient_email,
            patient_phone: appointment.patient_phone,
            patient_age: appointment.patient_age,
            doctor_id: appointment.doctor_id,
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time,
            reason: appointment.reason,
            symptoms: appointment.symptoms,
            notes: appointment.notes,
            is_first_visit: appointment.is_first_visit,
            emergency_contact: appointment.emergency_contact,
            insurance: appointment.insurance,
            preferred_language: appointment.preferred_language,
            status: appointment.status,
            reference_number: appointment.reference_number,
            cancelled_at: appointment.cancelled_at,
            updated_by: appointment.updated_by,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        }
    }
}

pub struct SupabaseAppointmentRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn filter_path(filter: &AppointmentFilter) -> String {
        let mut query_parts = vec!["order=appointment_date.asc".to_string()];

        if let Some(doctor_id) = &filter.doctor_id {
            query_parts.push(format!("doctor_id=eq.{}", urlencoding::encode(doctor_id)));
        }
        if let Some(date) = filter.date {
            query_parts.push(format!("appointment_date=eq.{}", date));
        }
        if !filter.statuses.is_empty() {
            let statuses: Vec<&str> = filter.statuses.iter().map(|s| s.as_str()).collect();
            query_parts.push(format!("status=in.({})", statuses.join(",")));
        }

        format!("/rest/v1/appointments?{}", query_parts.join("&"))
    }

    fn first_row(rows: Vec<AppointmentRow>) -> Option<Appointment> {
        rows.into_iter().next().map(Appointment::from)
    }
}

#[async_trait]
impl AppointmentRepository for SupabaseAppointmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        debug!("Fetching appointment {}", id);

        let path = format!("/rest/v1/appointments?id=eq.{}&limit=1", id);
        let rows: Vec<AppointmentRow> = self.supabase.request(Method::GET, &path, None, None).await?;

        Ok(Self::first_row(rows))
    }

    async fn find(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, DatabaseError> {
        let path = Self::filter_path(filter);
        debug!("Querying appointments: {}", path);

        let rows: Vec<AppointmentRow> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().map(Appointment::from).collect())
    }

    async fn find_slot_holder(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        time: &str,
    ) -> Result<Option<Appointment>, DatabaseError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_date=eq.{}&appointment_time=eq.{}&status=neq.cancelled&limit=1",
            urlencoding::encode(doctor_id),
            date,
            urlencoding::encode(time)
        );

        let rows: Vec<AppointmentRow> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(Self::first_row(rows))
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, DatabaseError> {
        debug!(
            "Inserting appointment {} for doctor {} at {} {}",
            appointment.id, appointment.doctor_id, appointment.appointment_date, appointment.appointment_time
        );

        let body = serde_json::to_value(AppointmentRow::from(appointment))?;
        let rows: Vec<AppointmentRow> = self.supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                None,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await?;

        Self::first_row(rows).ok_or_else(|| DatabaseError::Api {
            status: 201,
            message: "insert returned no representation".to_string(),
        })
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        change: StatusChange,
    ) -> Result<Option<Appointment>, DatabaseError> {
        let mut body = Map::new();
        body.insert("status".to_string(), json!(change.status));
        body.insert("updated_at".to_string(), json!(change.updated_at));
        if let Some(notes) = change.notes {
            body.insert("notes".to_string(), json!(notes));
        }
        if let Some(cancelled_at) = change.cancelled_at {
            body.insert("cancelled_at".to_string(), json!(cancelled_at));
        }
        if let Some(updated_by) = change.updated_by {
            body.insert("updated_by".to_string(), json!(updated_by));
        }

        let path = format!("/rest/v1/appointments?id=eq.{}&status=eq.{}", id, expected);
        let rows: Vec<AppointmentRow> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                None,
                Some(Value::Object(body)),
                Some(SupabaseClient::return_representation()),
            )
            .await?;

        Ok(Self::first_row(rows))
    }
}

// ==============================================================================
// IN-MEMORY IMPLEMENTATION
// ==============================================================================

/// Appointment book held in process memory. The slot check and the insert run
/// under one write lock, matching the store's unique index.
#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<Appointment> {
        self.appointments.read().await.clone()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        let appointments = self.appointments.read().await;
        Ok(appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn find(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, DatabaseError> {
        let appointments = self.appointments.read().await;
        Ok(appointments.iter().filter(|a| filter.matches(a)).cloned().collect())
    }

    async fn find_slot_holder(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        time: &str,
    ) -> Result<Option<Appointment>, DatabaseError> {
        let appointments = self.appointments.read().await;
        Ok(appointments
            .iter()
            .find(|a| a.occupies_slot(doctor_id, date, time))
            .cloned())
    }

    async fn insert(&self, appointment: Appointment) -> Result<Appointment, DatabaseError> {
        let mut appointments = self.appointments.write().await;

        let taken = appointment.status != AppointmentStatus::Cancelled
            && appointments.iter().any(|a| {
                a.occupies_slot(&appointment.doctor_id, appointment.appointment_date, &appointment.appointment_time)
            });
        if taken {
            warn!(
                "Rejected duplicate slot for doctor {} at {} {}",
                appointment.doctor_id, appointment.appointment_date, appointment.appointment_time
            );
            return Err(DatabaseError::UniqueViolation(ACTIVE_SLOT_CONSTRAINT.to_string()));
        }

        appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        change: StatusChange,
    ) -> Result<Option<Appointment>, DatabaseError> {
        let mut appointments = self.appointments.write().await;

        match appointments.iter_mut().find(|a| a.id == id && a.status == expected) {
            Some(appointment) => {
                change.apply_to(appointment);
                Ok(Some(appointment.clone()))
            }
            None => Ok(None),
        }
    }
}
