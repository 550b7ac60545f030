// libs/notification-cell/src/models.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything the confirmation email shows the patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentConfirmation {
    pub to: String,
    pub patient_name: String,
    pub date: String,
    pub time: String,
    pub doctor_name: String,
    /// Human-readable booking reference, e.g. `APPT-7K2M9QXA`.
    pub appointment_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResendEmailRequest<'a> {
    pub from: &'a str,
    pub to: Vec<&'a str>,
    pub subject: &'a str,
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResendEmailResponse {
    pub id: String,
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Email delivery is not configured")]
    NotConfigured,

    #[error("Email provider rejected the message ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Email request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
