// libs/notification-cell/src/services/dispatch.rs
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::models::AppointmentConfirmation;
use crate::services::NotificationSender;

/// Sends the confirmation on a detached task. The handle resolves to whether
/// delivery succeeded; callers are free to drop it. Failures are only logged.
pub fn spawn_confirmation(
    sender: Arc<dyn NotificationSender>,
    confirmation: AppointmentConfirmation,
) -> JoinHandle<bool> {
    tokio::spawn(async move {
        let reference = confirmation.appointment_id.clone();
        match sender.send_appointment_confirmation(confirmation).await {
            Ok(()) => {
                info!("Confirmation email sent for appointment {}", reference);
                true
            }
            Err(e) => {
                warn!("Confirmation email for appointment {} not sent: {}", reference, e);
                false
            }
        }
    })
}
