use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub resend_api_key: String,
    pub resend_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            resend_api_key: String::new(),
            resend_base_url: "http://localhost:54322".to_string(),
        }
    }
}

impl TestConfig {
    /// Points both the store and the email provider at a mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            supabase_url: uri.to_string(),
            resend_base_url: uri.to_string(),
            resend_api_key: "re_test_key".to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            resend_api_key: self.resend_api_key.clone(),
            resend_base_url: self.resend_base_url.clone(),
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "staff".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn staff(email: &str) -> Self {
        Self::new(email, "staff")
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    /// `Authorization` header value for a freshly signed staff token.
    pub fn bearer_for(user: &TestUser, secret: &str) -> String {
        format!("Bearer {}", Self::create_test_token(user, secret, None))
    }
}

/// PostgREST row payloads as the store returns them.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_row(doctor_id: &str, name: &str, specializations: &[&str], is_active: bool) -> Value {
        json!({
            "id": doctor_id,
            "name": name,
            "title": "MD",
            "specialization": specializations,
            "experience": 12,
            "bio": "Board-certified otolaryngologist",
            "image": null,
            "languages": ["English"],
            "consultation_fee": 150.0,
            "rating": 4.9,
            "is_active": is_active
        })
    }

    pub fn appointment_row(doctor_id: &str, date: &str, time: &str, status: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "patient_name": "Jane Doe",
            "patient_email": "jane@example.com",
            "patient_phone": "555-0100",
            "patient_age": 34,
            "doctor_id": doctor_id,
            "appointment_date": date,
            "appointment_time": time,
            "reason": "Hearing test",
            "symptoms": null,
            "notes": null,
            "is_first_visit": true,
            "emergency_contact": null,
            "insurance": null,
            "preferred_language": "English",
            "status": status,
            "reference_number": "APPT-7K2M9QXA",
            "cancelled_at": null,
            "updated_by": null,
            "created_at": "2025-07-20T10:00:00Z",
            "updated_at": "2025-07-20T10:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "code": code,
            "message": message,
            "details": null,
            "hint": null
        })
    }
}
