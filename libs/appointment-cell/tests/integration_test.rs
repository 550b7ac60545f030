use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{AvailabilityRequest, BookAppointmentRequest, UpdateStatusRequest};
use appointment_cell::{
    AppointmentBookingService, AppointmentError, AppointmentStatus, AvailabilityService,
    SupabaseAppointmentRepository,
};
use doctor_cell::SupabaseDoctorRepository;
use notification_cell::sender_from_config;
use shared_database::{DatabaseError, SupabaseClient};
use shared_models::error::AppError;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig, TestUser};

struct StoreBackedClinic {
    booking: AppointmentBookingService,
    availability: AvailabilityService,
}

fn create_clinic(mock_server: &MockServer) -> StoreBackedClinic {
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    let supabase = Arc::new(SupabaseClient::new(&config));
    let appointments = Arc::new(SupabaseAppointmentRepository::new(Arc::clone(&supabase)));

    StoreBackedClinic {
        booking: AppointmentBookingService::new(
            appointments.clone(),
            Arc::new(SupabaseDoctorRepository::new(supabase)),
            sender_from_config(&config),
        ),
        availability: AvailabilityService::new(appointments),
    }
}

fn booking_request() -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_name: Some("Jane Doe".to_string()),
        patient_email: Some("jane@example.com".to_string()),
        patient_phone: Some("555-0100".to_string()),
        patient_age: Some(json!(34)),
        doctor_id: Some("doc-1".to_string()),
        appointment_date: Some("2025-08-01".to_string()),
        appointment_time: Some("10:00 AM".to_string()),
        reason: Some("Hearing test".to_string()),
        ..Default::default()
    }
}

async fn mount_doctor(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", "eq.doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row("doc-1", "Dr. Sarah Johnson", &["General ENT"], true)
        ])))
        .mount(mock_server)
        .await;
}

async fn mount_free_slot(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.doc-1"))
        .and(query_param("appointment_time", "eq.10:00 AM"))
        .and(query_param("status", "neq.cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;
}

fn row_with_id(id: Uuid, status: &str) -> Value {
    let mut row = MockSupabaseResponses::appointment_row("doc-1", "2025-08-01", "10:00 AM", status);
    row["id"] = json!(id);
    row
}

#[tokio::test]
async fn test_booking_writes_row_and_sends_email() {
    let mock_server = MockServer::start().await;
    mount_doctor(&mock_server).await;
    mount_free_slot(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({
            "doctor_id": "doc-1",
            "appointment_date": "2025-08-01",
            "appointment_time": "10:00 AM",
            "status": "confirmed",
            "patient_age": 34
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment_row("doc-1", "2025-08-01", "10:00 AM", "confirmed")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(body_partial_json(json!({ "to": ["jane@example.com"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "email-1" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let receipt = create_clinic(&mock_server).booking.book_appointment(booking_request()).await.unwrap();

    assert_eq!(receipt.appointment.appointment.status, AppointmentStatus::Confirmed);
    assert_eq!(receipt.appointment.doctor_name.as_deref(), Some("Dr. Sarah Johnson"));
    assert!(receipt.notification.await.unwrap());
}

#[tokio::test]
async fn test_unique_violation_on_insert_is_a_conflict() {
    let mock_server = MockServer::start().await;
    mount_doctor(&mock_server).await;
    mount_free_slot(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(MockSupabaseResponses::error_response(
            "duplicate key value violates unique constraint \"appointments_active_slot_idx\"",
            "23505",
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = create_clinic(&mock_server).booking.book_appointment(booking_request()).await;

    assert_matches!(result, Err(AppointmentError::SlotAlreadyBooked));
}

#[tokio::test]
async fn test_foreign_key_violation_on_insert_is_a_storage_error() {
    let mock_server = MockServer::start().await;
    mount_doctor(&mock_server).await;
    mount_free_slot(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(MockSupabaseResponses::error_response(
            "insert or update on table \"appointments\" violates foreign key constraint \"appointments_doctor_id_fkey\"",
            "23503",
        )))
        .mount(&mock_server)
        .await;

    let err = create_clinic(&mock_server).booking.book_appointment(booking_request()).await.unwrap_err();

    assert_matches!(err, AppointmentError::Storage(DatabaseError::Api { status: 409, .. }));
    assert_eq!(AppError::from(err).status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_precheck_hit_skips_insert() {
    let mock_server = MockServer::start().await;
    mount_doctor(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "neq.cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row("doc-1", "2025-08-01", "10:00 AM", "pending")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = create_clinic(&mock_server).booking.book_appointment(booking_request()).await;

    assert_matches!(result, Err(AppointmentError::SlotAlreadyBooked));
}

#[tokio::test]
async fn test_availability_reads_slot_holding_statuses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.doc-1"))
        .and(query_param("appointment_date", "eq.2025-08-01"))
        .and(query_param("status", "in.(pending,confirmed)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row("doc-1", "2025-08-01", "9:00 AM", "confirmed"),
            MockSupabaseResponses::appointment_row("doc-1", "2025-08-01", "2:30 PM", "pending")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let slots = create_clinic(&mock_server)
        .availability
        .check_availability(AvailabilityRequest {
            doctor_id: Some("doc-1".to_string()),
            date: Some("2025-08-01".to_string()),
        })
        .await
        .unwrap();

    let taken: Vec<&str> = slots.iter().filter(|s| !s.available).map(|s| s.time.as_str()).collect();
    assert_eq!(taken, vec!["9:00 AM", "2:30 PM"]);
    assert_eq!(slots.len(), 16);
}

#[tokio::test]
async fn test_store_outage_is_a_generic_500() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let err = create_clinic(&mock_server)
        .availability
        .check_availability(AvailabilityRequest {
            doctor_id: Some("doc-1".to_string()),
            date: Some("2025-08-01".to_string()),
        })
        .await
        .unwrap_err();

    assert_matches!(err, AppointmentError::Storage(_));
    let app_error = AppError::from(err);
    assert_eq!(app_error.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!app_error.to_string().contains("upstream unavailable"));
}

#[tokio::test]
async fn test_cancellation_patches_only_the_expected_status() {
    let mock_server = MockServer::start().await;
    mount_doctor(&mock_server).await;
    let id = Uuid::new_v4();
    let staff = TestUser::staff("frontdesk@clinic.example").to_user();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row_with_id(id, "confirmed")])))
        .mount(&mock_server)
        .await;

    let mut cancelled_row = row_with_id(id, "cancelled");
    cancelled_row["cancelled_at"] = json!("2025-07-30T09:00:00Z");
    cancelled_row["updated_by"] = json!(staff.id);

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", id)))
        .and(query_param("status", "eq.confirmed"))
        .and(body_partial_json(json!({ "status": "cancelled", "updated_by": staff.id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cancelled_row])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let details = create_clinic(&mock_server)
        .booking
        .update_status(
            id,
            UpdateStatusRequest { status: Some("cancelled".to_string()), notes: None },
            &staff,
        )
        .await
        .unwrap();

    assert_eq!(details.appointment.status, AppointmentStatus::Cancelled);
    assert!(details.appointment.cancelled_at.is_some());
    assert_eq!(details.doctor_name.as_deref(), Some("Dr. Sarah Johnson"));
}
