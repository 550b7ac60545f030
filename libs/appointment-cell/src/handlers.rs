// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::{auth::User, error::AppError};

use crate::models::{
    AppointmentQuery, AvailabilityRequest, AvailabilityResponse, BookAppointmentRequest,
    UpdateStatusRequest,
};
use crate::router::AppointmentState;

/// Body rejections (bad JSON, unknown fields, wrong types) are caller input errors.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::ValidationError(rejection.body_text()))
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn check_availability(
    State(state): State<AppointmentState>,
    payload: Result<Json<AvailabilityRequest>, JsonRejection>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let request = json_body(payload)?;
    let available_slots = state.availability.check_availability(request).await?;

    Ok(Json(AvailabilityResponse { available_slots }))
}

#[axum::debug_handler]
pub async fn check_availability_query(
    State(state): State<AppointmentState>,
    Query(request): Query<AvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let available_slots = state.availability.check_availability(request).await?;

    Ok(Json(AvailabilityResponse { available_slots }))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppointmentState>,
    payload: Result<Json<BookAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let request = json_body(payload)?;
    let receipt = state.booking.book_appointment(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Appointment booked successfully",
            "appointment": receipt.appointment
        })),
    ))
}

// ==============================================================================
// PROTECTED HANDLERS (AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppointmentState>,
    Extension(_user): Extension<User>,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.booking.list_appointments(query).await?;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.get_appointment(appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let request = json_body(payload)?;
    let appointment = state.booking.update_status(appointment_id, request, &user).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Appointment {}", appointment.appointment.status),
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.cancel_appointment(appointment_id, &user).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled",
        "appointment": appointment
    })))
}
