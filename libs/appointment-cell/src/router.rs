// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use doctor_cell::DoctorRepository;
use notification_cell::NotificationSender;
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::{AppointmentBookingService, AppointmentRepository, AvailabilityService};

#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub booking: Arc<AppointmentBookingService>,
    pub availability: Arc<AvailabilityService>,
}

impl AppointmentState {
    pub fn new(
        config: Arc<AppConfig>,
        appointments: Arc<dyn AppointmentRepository>,
        doctors: Arc<dyn DoctorRepository>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            config,
            booking: Arc::new(AppointmentBookingService::new(
                Arc::clone(&appointments),
                doctors,
                notifier,
            )),
            availability: Arc::new(AvailabilityService::new(appointments)),
        }
    }
}

/// Mounted at `/api/appointments`. Booking is public; management requires a
/// bearer token.
pub fn appointment_routes(state: AppointmentState) -> Router {
    let public_routes = Router::new()
        .route("/", post(handlers::book_appointment));

    let protected_routes = Router::new()
        .route("/", get(handlers::list_appointments))
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment)
                .patch(handlers::update_appointment_status)
                .delete(handlers::cancel_appointment),
        )
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Mounted at `/api/availability`. Public.
pub fn availability_routes(state: AppointmentState) -> Router {
    Router::new()
        .route(
            "/",
            post(handlers::check_availability).get(handlers::check_availability_query),
        )
        .with_state(state)
}
