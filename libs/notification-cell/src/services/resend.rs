// libs/notification-cell/src/services/resend.rs
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;

use crate::models::{
    AppointmentConfirmation, NotificationError, ResendEmailRequest, ResendEmailResponse,
};
use crate::services::NotificationSender;

const CONFIRMATION_SUBJECT: &str = "Your Appointment Confirmation";

/// Resend transactional email client.
/// Based on: https://resend.com/docs/api-reference/emails/send-email
pub struct ResendEmailSender {
    client: Client,
    api_key: String,
    base_url: String,
    from_address: String,
}

impl ResendEmailSender {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.resend_api_key.clone(),
            base_url: config.resend_base_url.trim_end_matches('/').to_string(),
            from_address: config.notification_from_address.clone(),
        }
    }
}

#[async_trait]
impl NotificationSender for ResendEmailSender {
    async fn send_appointment_confirmation(
        &self,
        confirmation: AppointmentConfirmation,
    ) -> Result<(), NotificationError> {
        let url = format!("{}/emails", self.base_url);
        debug!("Sending appointment confirmation {} via {}", confirmation.appointment_id, url);

        let request_body = ResendEmailRequest {
            from: &self.from_address,
            to: vec![confirmation.to.as_str()],
            subject: CONFIRMATION_SUBJECT,
            html: render_confirmation_html(&confirmation),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Resend rejected confirmation email: {} - {}", status, message);
            return Err(NotificationError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let sent: ResendEmailResponse = response.json().await?;
        info!("Confirmation email {} queued for appointment {}", sent.id, confirmation.appointment_id);
        Ok(())
    }
}

/// Used when no API key is configured; every send is skipped.
pub struct DisabledNotificationSender;

#[async_trait]
impl NotificationSender for DisabledNotificationSender {
    async fn send_appointment_confirmation(
        &self,
        confirmation: AppointmentConfirmation,
    ) -> Result<(), NotificationError> {
        warn!("Skipping confirmation email for appointment {}: email not configured",
              confirmation.appointment_id);
        Err(NotificationError::NotConfigured)
    }
}

pub fn render_confirmation_html(confirmation: &AppointmentConfirmation) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Appointment Confirmed</h2>
  <p>Dear {patient},</p>
  <p>Your appointment has been confirmed with the following details:</p>
  <div style="background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin: 20px 0;">
    <p><strong>Doctor:</strong> {doctor}</p>
    <p><strong>Date:</strong> {date}</p>
    <p><strong>Time:</strong> {time}</p>
    <p><strong>Appointment ID:</strong> {reference}</p>
  </div>
  <p>Please arrive 15 minutes before your scheduled time.</p>
  <p>If you need to reschedule or cancel, please call the clinic.</p>
</div>"#,
        patient = escape_html(&confirmation.patient_name),
        doctor = escape_html(&confirmation.doctor_name),
        date = escape_html(&confirmation.date),
        time = escape_html(&confirmation.time),
        reference = escape_html(&confirmation.appointment_id),
    )
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmation() -> AppointmentConfirmation {
        AppointmentConfirmation {
            to: "jane@example.com".to_string(),
            patient_name: "Jane <Doe>".to_string(),
            date: "2025-08-01".to_string(),
            time: "10:00 AM".to_string(),
            doctor_name: "Dr. Sarah Johnson".to_string(),
            appointment_id: "APPT-7K2M9QXA".to_string(),
        }
    }

    #[test]
    fn html_contains_details_and_escapes_patient_input() {
        let html = render_confirmation_html(&confirmation());
        assert!(html.contains("Dr. Sarah Johnson"));
        assert!(html.contains("10:00 AM"));
        assert!(html.contains("APPT-7K2M9QXA"));
        assert!(html.contains("Jane &lt;Doe&gt;"));
        assert!(!html.contains("<Doe>"));
    }
}
