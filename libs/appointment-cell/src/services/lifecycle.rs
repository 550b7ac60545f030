// libs/appointment-cell/src/services/lifecycle.rs
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::models::{AppointmentError, AppointmentStatus, StatusChange};

pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }

        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Pending => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::Cancelled,
                AppointmentStatus::Completed,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Cancelled => vec![],
            AppointmentStatus::Completed => vec![],
        }
    }

    /// Build the write for a validated transition. Cancelling stamps
    /// `cancelled_at`; notes are only replaced when provided.
    pub fn plan_status_change(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
        notes: Option<String>,
        updated_by: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, AppointmentError> {
        self.validate_status_transition(current_status, new_status)?;

        info!("Status transition planned: {} -> {}", current_status, new_status);
        Ok(StatusChange {
            status: new_status,
            notes: notes.filter(|n| !n.trim().is_empty()),
            cancelled_at: (new_status == AppointmentStatus::Cancelled).then_some(now),
            updated_by,
            updated_at: now,
        })
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn pending_and_confirmed_can_be_cancelled() {
        let lifecycle = AppointmentLifecycleService::new();

        assert!(lifecycle
            .validate_status_transition(AppointmentStatus::Pending, AppointmentStatus::Cancelled)
            .is_ok());
        assert!(lifecycle
            .validate_status_transition(AppointmentStatus::Confirmed, AppointmentStatus::Cancelled)
            .is_ok());
        assert!(lifecycle
            .validate_status_transition(AppointmentStatus::Confirmed, AppointmentStatus::Completed)
            .is_ok());
    }

    #[test]
    fn terminal_states_do_not_move() {
        let lifecycle = AppointmentLifecycleService::new();

        for terminal in [AppointmentStatus::Cancelled, AppointmentStatus::Completed] {
            assert!(lifecycle.get_valid_transitions(terminal).is_empty());
            assert_matches!(
                lifecycle.validate_status_transition(terminal, AppointmentStatus::Confirmed),
                Err(AppointmentError::InvalidStatusTransition { .. })
            );
        }
    }

    #[test]
    fn pending_cannot_skip_to_completed() {
        let lifecycle = AppointmentLifecycleService::new();
        assert_matches!(
            lifecycle.validate_status_transition(AppointmentStatus::Pending, AppointmentStatus::Completed),
            Err(AppointmentError::InvalidStatusTransition {
                from: AppointmentStatus::Pending,
                to: AppointmentStatus::Completed
            })
        );
    }

    #[test]
    fn cancellation_plan_stamps_cancelled_at() {
        let lifecycle = AppointmentLifecycleService::new();
        let now = Utc::now();

        let change = lifecycle
            .plan_status_change(
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
                Some("Patient called".to_string()),
                Some("staff-1".to_string()),
                now,
            )
            .unwrap();

        assert_eq!(change.status, AppointmentStatus::Cancelled);
        assert_eq!(change.cancelled_at, Some(now));
        assert_eq!(change.notes.as_deref(), Some("Patient called"));
        assert_eq!(change.updated_at, now);

        let completion = lifecycle
            .plan_status_change(AppointmentStatus::Confirmed, AppointmentStatus::Completed, Some("  ".into()), None, now)
            .unwrap();
        assert_eq!(completion.cancelled_at, None);
        assert_eq!(completion.notes, None);
    }
}
