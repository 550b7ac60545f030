use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use crate::handlers;
use crate::services::doctor::DoctorService;

/// Doctor directory routes. All of them are public.
pub fn doctor_routes(service: Arc<DoctorService>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .with_state(service)
}
