use axum::{routing::get, Router};

use appointment_cell::{appointment_routes, availability_routes};
use doctor_cell::doctor_routes;

use crate::state::ApiState;

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/api/availability", availability_routes(state.appointments.clone()))
        .nest("/api/appointments", appointment_routes(state.appointments.clone()))
        .nest("/api/doctors", doctor_routes(state.doctors))
}
