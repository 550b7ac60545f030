use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::DoctorSearchQuery;
use crate::services::doctor::DoctorService;

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(service): State<Arc<DoctorService>>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = service.search_doctors(&query).await?;

    Ok(Json(json!({
        "success": true,
        "doctors": doctors
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(service): State<Arc<DoctorService>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor = service.get_doctor(&doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "doctor": doctor
    })))
}
