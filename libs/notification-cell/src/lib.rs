// libs/notification-cell/src/lib.rs
//! Patient notifications. Today this is the appointment confirmation email,
//! delivered through Resend and always dispatched off the request path.

pub mod models;
pub mod services;

pub use models::{AppointmentConfirmation, NotificationError};
pub use services::{
    dispatch::spawn_confirmation,
    resend::{DisabledNotificationSender, ResendEmailSender},
    NotificationSender,
};

use std::sync::Arc;

use shared_config::AppConfig;
use tracing::warn;

/// Picks the Resend sender when an API key is configured, otherwise a sender
/// that skips delivery.
pub fn sender_from_config(config: &AppConfig) -> Arc<dyn NotificationSender> {
    if config.is_email_configured() {
        Arc::new(ResendEmailSender::new(config))
    } else {
        warn!("Resend API key is missing, confirmation emails will be skipped");
        Arc::new(DisabledNotificationSender)
    }
}
