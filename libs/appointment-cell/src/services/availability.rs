// libs/appointment-cell/src/services/availability.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{require_text, AppointmentError, AppointmentFilter, AvailabilityRequest, TimeSlot};
use crate::services::repository::AppointmentRepository;
use crate::services::slots::{clinic_day_slots, parse_calendar_date};

pub struct AvailabilityService {
    appointments: Arc<dyn AppointmentRepository>,
}

impl AvailabilityService {
    pub fn new(appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self { appointments }
    }

    /// Validate an availability request and mark the doctor's slots for that day.
    pub async fn check_availability(
        &self,
        request: AvailabilityRequest,
    ) -> Result<Vec<TimeSlot>, AppointmentError> {
        let doctor_id = require_text(request.doctor_id, "doctorId")?;
        let raw_date = require_text(request.date, "date")?;
        let date = parse_calendar_date(&raw_date).ok_or_else(|| {
            AppointmentError::ValidationError("date must be a valid calendar date".to_string())
        })?;

        self.slots_for(&doctor_id, date).await
    }

    /// Every clinic slot for the day, in clinic order. A slot is unavailable
    /// when a pending or confirmed appointment holds it. Unknown doctors simply
    /// have no bookings.
    pub async fn slots_for(
        &self,
        doctor_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, AppointmentError> {
        let booked: HashSet<String> = self
            .appointments
            .find(&AppointmentFilter::slot_holders(doctor_id, date))
            .await?
            .into_iter()
            .map(|appointment| appointment.appointment_time)
            .collect();

        debug!("Doctor {} has {} booked slots on {}", doctor_id, booked.len(), date);
        Ok(mark_availability(clinic_day_slots(), &booked))
    }
}

pub fn mark_availability(slots: Vec<String>, booked: &HashSet<String>) -> Vec<TimeSlot> {
    slots
        .into_iter()
        .map(|time| {
            let available = !booked.contains(&time);
            TimeSlot { time, available }
        })
        .collect()
}
