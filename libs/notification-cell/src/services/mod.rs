pub mod dispatch;
pub mod resend;

use async_trait::async_trait;

use crate::models::{AppointmentConfirmation, NotificationError};

/// Outbound channel for patient notifications.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_appointment_confirmation(
        &self,
        confirmation: AppointmentConfirmation,
    ) -> Result<(), NotificationError>;
}
