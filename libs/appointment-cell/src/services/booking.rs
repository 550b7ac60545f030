// libs/appointment-cell/src/services/booking.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::{DoctorError, DoctorRepository, DoctorService};
use notification_cell::{spawn_confirmation, AppointmentConfirmation, NotificationSender};
use shared_models::auth::User;

use crate::models::{
    require_text, Appointment, AppointmentDetails, AppointmentError, AppointmentFilter,
    AppointmentQuery, AppointmentStatus, BookAppointmentRequest, NewAppointment,
    UpdateStatusRequest,
};
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::reference::generate_reference_number;
use crate::services::repository::AppointmentRepository;
use crate::services::slots::{is_clinic_slot, parse_calendar_date, parse_slot_label};

/// A committed booking plus the handle of its confirmation email task.
#[derive(Debug)]
pub struct BookingReceipt {
    pub appointment: AppointmentDetails,
    /// Resolves to whether the email went out. Dropping it detaches the task.
    pub notification: JoinHandle<bool>,
}

pub struct AppointmentBookingService {
    appointments: Arc<dyn AppointmentRepository>,
    doctor_service: DoctorService,
    lifecycle_service: AppointmentLifecycleService,
    notifier: Arc<dyn NotificationSender>,
}

impl AppointmentBookingService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        doctors: Arc<dyn DoctorRepository>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            appointments,
            doctor_service: DoctorService::new(doctors),
            lifecycle_service: AppointmentLifecycleService::new(),
            notifier,
        }
    }

    /// Validate, check the slot, persist, then hand the confirmation email
    /// to a detached task.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<BookingReceipt, AppointmentError> {
        // **Step 1: Field validation, before any store access**
        let new_appointment = validate_booking_request(request)?;
        info!(
            "Booking appointment with doctor {} on {} at {}",
            new_appointment.doctor_id, new_appointment.appointment_date, new_appointment.appointment_time
        );

        // **Step 2: Doctor must exist and be taking bookings**
        let doctor = self
            .doctor_service
            .get_active_doctor(&new_appointment.doctor_id)
            .await
            .map_err(|e| match e {
                DoctorError::NotFound => AppointmentError::DoctorNotFound,
                DoctorError::Storage(e) => AppointmentError::Storage(e),
            })?;

        // **Step 3: Fast-path conflict check**
        if let Some(existing) = self
            .appointments
            .find_slot_holder(
                &new_appointment.doctor_id,
                new_appointment.appointment_date,
                &new_appointment.appointment_time,
            )
            .await?
        {
            warn!(
                "Slot {} {} for doctor {} already held by appointment {} ({})",
                new_appointment.appointment_date, new_appointment.appointment_time,
                new_appointment.doctor_id, existing.id, existing.status
            );
            return Err(AppointmentError::SlotAlreadyBooked);
        }

        // **Step 4: Insert; the store's uniqueness check has the final word**
        let appointment = new_appointment.into_appointment(generate_reference_number(), Utc::now());
        let appointment = self.appointments.insert(appointment).await.map_err(|e| {
            if e.is_unique_violation() {
                warn!("Slot taken concurrently for doctor {}: {}", doctor.id, e);
                AppointmentError::SlotAlreadyBooked
            } else {
                AppointmentError::Storage(e)
            }
        })?;

        info!(
            "Appointment {} booked ({}) with doctor {}",
            appointment.id,
            appointment.reference_number.as_deref().unwrap_or("-"),
            doctor.id
        );

        // **Step 5: Confirmation email, fire-and-forget**
        let confirmation = AppointmentConfirmation {
            to: appointment.patient_email.clone(),
            patient_name: appointment.patient_name.clone(),
            date: appointment.appointment_date.format("%A, %B %-d, %Y").to_string(),
            time: appointment.appointment_time.clone(),
            doctor_name: doctor.display_name().to_string(),
            appointment_id: appointment
                .reference_number
                .clone()
                .unwrap_or_else(|| appointment.id.to_string()),
        };
        let notification = spawn_confirmation(Arc::clone(&self.notifier), confirmation);

        Ok(BookingReceipt {
            appointment: AppointmentDetails {
                appointment,
                doctor_name: Some(doctor.display_name().to_string()),
            },
            notification,
        })
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<AppointmentDetails, AppointmentError> {
        debug!("Fetching appointment {}", appointment_id);

        let appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        let mut names = HashMap::new();
        self.with_doctor_name(appointment, &mut names).await
    }

    /// Appointments matching the query, ordered by date then slot.
    pub async fn list_appointments(
        &self,
        query: AppointmentQuery,
    ) -> Result<Vec<AppointmentDetails>, AppointmentError> {
        let filter = build_filter(query)?;
        let mut appointments = self.appointments.find(&filter).await?;
        appointments.sort_by_key(|a| (a.appointment_date, parse_slot_label(&a.appointment_time)));

        debug!("Listing {} appointments for {:?}", appointments.len(), filter);

        let mut names = HashMap::new();
        let mut details = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            details.push(self.with_doctor_name(appointment, &mut names).await?);
        }
        Ok(details)
    }

    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        request: UpdateStatusRequest,
        caller: &User,
    ) -> Result<AppointmentDetails, AppointmentError> {
        let new_status = match request.status.as_deref().map(str::parse::<AppointmentStatus>) {
            Some(Ok(status)) if status != AppointmentStatus::Pending => status,
            _ => return Err(AppointmentError::ValidationError("Invalid status update".to_string())),
        };

        self.transition(appointment_id, new_status, request.notes, caller).await
    }

    /// Cancellation keeps the record and frees the slot.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        caller: &User,
    ) -> Result<AppointmentDetails, AppointmentError> {
        self.transition(appointment_id, AppointmentStatus::Cancelled, None, caller).await
    }

    async fn transition(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        notes: Option<String>,
        caller: &User,
    ) -> Result<AppointmentDetails, AppointmentError> {
        let current = self
            .appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        let change = self.lifecycle_service.plan_status_change(
            current.status,
            new_status,
            notes,
            Some(caller.id.clone()),
            Utc::now(),
        )?;

        let updated = match self
            .appointments
            .update_status(appointment_id, current.status, change)
            .await?
        {
            Some(updated) => updated,
            None => {
                // Someone else moved it between our read and write.
                let latest = self
                    .appointments
                    .find_by_id(appointment_id)
                    .await?
                    .ok_or(AppointmentError::NotFound)?;
                warn!("Appointment {} changed concurrently to {}", appointment_id, latest.status);
                return Err(AppointmentError::InvalidStatusTransition {
                    from: latest.status,
                    to: new_status,
                });
            }
        };

        info!(
            "Appointment {} moved {} -> {} by {}",
            appointment_id, current.status, updated.status, caller.id
        );

        let mut names = HashMap::new();
        self.with_doctor_name(updated, &mut names).await
    }

    async fn with_doctor_name(
        &self,
        appointment: Appointment,
        names: &mut HashMap<String, Option<String>>,
    ) -> Result<AppointmentDetails, AppointmentError> {
        let doctor_name = match names.get(&appointment.doctor_id) {
            Some(name) => name.clone(),
            None => {
                let name = match self.doctor_service.get_doctor(&appointment.doctor_id).await {
                    Ok(doctor) => Some(doctor.display_name().to_string()),
                    Err(DoctorError::NotFound) => None,
                    Err(DoctorError::Storage(e)) => return Err(AppointmentError::Storage(e)),
                };
                names.insert(appointment.doctor_id.clone(), name.clone());
                name
            }
        };

        Ok(AppointmentDetails { appointment, doctor_name })
    }
}

// ==============================================================================
// REQUEST VALIDATION
// ==============================================================================

/// Checks required fields in form order and reports the first one missing.
pub fn validate_booking_request(request: BookAppointmentRequest) -> Result<NewAppointment, AppointmentError> {
    let patient_name = require_text(request.patient_name, "patientName")?;
    let patient_email = require_text(request.patient_email, "patientEmail")?;
    let patient_phone = require_text(request.patient_phone, "patientPhone")?;
    let patient_age = parse_patient_age(request.patient_age)?;
    let doctor_id = require_text(request.doctor_id, "doctorId")?;
    let raw_date = require_text(request.appointment_date, "appointmentDate")?;
    let appointment_time = require_text(request.appointment_time, "appointmentTime")?;
    let reason = require_text(request.reason, "reason")?;

    let appointment_date = parse_calendar_date(&raw_date).ok_or_else(|| {
        AppointmentError::ValidationError("appointmentDate must be a valid calendar date".to_string())
    })?;

    if !is_clinic_slot(&appointment_time) {
        return Err(AppointmentError::ValidationError(format!(
            "appointmentTime must be one of the clinic's time slots, got '{}'",
            appointment_time
        )));
    }

    Ok(NewAppointment {
        patient_name,
        patient_email,
        patient_phone,
        patient_age,
        doctor_id,
        appointment_date,
        appointment_time,
        reason,
        symptoms: non_blank(request.symptoms),
        notes: non_blank(request.notes),
        is_first_visit: request.is_first_visit.unwrap_or(true),
        emergency_contact: request.emergency_contact,
        insurance: request.insurance,
        preferred_language: non_blank(request.preferred_language).unwrap_or_else(|| "English".to_string()),
    })
}

/// Form inputs deliver the age as a string; API clients send a number.
fn parse_patient_age(value: Option<Value>) -> Result<u32, AppointmentError> {
    let age = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.trim().parse::<u32>().ok()),
        Some(Value::Number(n)) => Some(n.as_u64().and_then(|n| u32::try_from(n).ok())),
        Some(_) => Some(None),
    };

    match age {
        None => Err(AppointmentError::ValidationError("patientAge is required".to_string())),
        Some(Some(age)) if age > 0 => Ok(age),
        Some(_) => Err(AppointmentError::ValidationError(
            "patientAge must be a positive whole number".to_string(),
        )),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn build_filter(query: AppointmentQuery) -> Result<AppointmentFilter, AppointmentError> {
    let date = match non_blank(query.date) {
        Some(raw) => Some(parse_calendar_date(&raw).ok_or_else(|| {
            AppointmentError::ValidationError("date must be a valid calendar date".to_string())
        })?),
        None => None,
    };

    let statuses = match non_blank(query.status) {
        Some(raw) => vec![raw
            .parse::<AppointmentStatus>()
            .map_err(|_| AppointmentError::ValidationError("Invalid status filter".to_string()))?],
        None => Vec::new(),
    };

    Ok(AppointmentFilter {
        doctor_id: non_blank(query.doctor_id),
        date,
        statuses,
    })
}
