// libs/doctor-cell/src/services/repository.rs
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{Doctor, DoctorSearchQuery};

/// Read access to the doctor directory.
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// Returns `None` when no doctor has this id, active or not.
    async fn get_doctor_by_id(&self, id: &str) -> Result<Option<Doctor>, DatabaseError>;

    /// Doctors matching the query, sorted by name.
    async fn list_doctors(&self, query: &DoctorSearchQuery) -> Result<Vec<Doctor>, DatabaseError>;
}

// ==============================================================================
// POSTGREST IMPLEMENTATION
// ==============================================================================

/// Row shape of the `doctors` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRow {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub specialization: Vec<String>,
    pub experience: Option<i32>,
    pub bio: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub consultation_fee: Option<f64>,
    pub rating: Option<f32>,
    pub is_active: bool,
}

impl From<DoctorRow> for Doctor {
    fn from(row: DoctorRow) -> Self {
        Doctor {
            id: row.id,
            name: row.name,
            title: row.title,
            specialization: row.specialization,
            experience: row.experience,
            bio: row.bio,
            image: row.image,
            languages: row.languages,
            consultation_fee: row.consultation_fee,
            rating: row.rating,
            is_active: row.is_active,
        }
    }
}

pub struct SupabaseDoctorRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDoctorRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl DoctorRepository for SupabaseDoctorRepository {
    async fn get_doctor_by_id(&self, id: &str) -> Result<Option<Doctor>, DatabaseError> {
        debug!("Fetching doctor {}", id);

        let path = format!("/rest/v1/doctors?id=eq.{}&limit=1", urlencoding::encode(id));
        let rows: Vec<DoctorRow> = self.supabase.request(Method::GET, &path, None, None).await?;

        Ok(rows.into_iter().next().map(Doctor::from))
    }

    async fn list_doctors(&self, query: &DoctorSearchQuery) -> Result<Vec<Doctor>, DatabaseError> {
        let mut path = format!(
            "/rest/v1/doctors?is_active=eq.{}&order=name.asc",
            query.active_only()
        );
        if let Some(specialization) = &query.specialization {
            path.push_str(&format!(
                "&specialization=cs.{}",
                urlencoding::encode(&format!("{{\"{}\"}}", specialization))
            ));
        }

        debug!("Listing doctors with {:?}", query);
        let rows: Vec<DoctorRow> = self.supabase.request(Method::GET, &path, None, None).await?;

        Ok(rows.into_iter().map(Doctor::from).collect())
    }
}

// ==============================================================================
// IN-MEMORY IMPLEMENTATION
// ==============================================================================

/// Directory held in process memory. Used by tests and by the API when no
/// store is configured.
#[derive(Default)]
pub struct InMemoryDoctorRepository {
    doctors: RwLock<Vec<Doctor>>,
}

impl InMemoryDoctorRepository {
    pub fn new(doctors: Vec<Doctor>) -> Self {
        Self {
            doctors: RwLock::new(doctors),
        }
    }

    /// The clinic's published roster.
    pub fn seeded() -> Self {
        Self::new(clinic_roster())
    }

    pub async fn upsert(&self, doctor: Doctor) {
        let mut doctors = self.doctors.write().await;
        match doctors.iter_mut().find(|d| d.id == doctor.id) {
            Some(existing) => *existing = doctor,
            None => doctors.push(doctor),
        }
    }
}

#[async_trait]
impl DoctorRepository for InMemoryDoctorRepository {
    async fn get_doctor_by_id(&self, id: &str) -> Result<Option<Doctor>, DatabaseError> {
        let doctors = self.doctors.read().await;
        Ok(doctors.iter().find(|d| d.id == id).cloned())
    }

    async fn list_doctors(&self, query: &DoctorSearchQuery) -> Result<Vec<Doctor>, DatabaseError> {
        let doctors = self.doctors.read().await;
        let mut matching: Vec<Doctor> = doctors.iter().filter(|d| query.matches(d)).cloned().collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matching)
    }
}

fn clinic_roster() -> Vec<Doctor> {
    let doctor = |id: &str, name: &str, title: &str, specialization: &[&str], experience: i32,
                  bio: &str, languages: &[&str], fee: f64, rating: f32| Doctor {
        id: id.to_string(),
        name: name.to_string(),
        title: title.to_string(),
        specialization: specialization.iter().map(|s| s.to_string()).collect(),
        experience: Some(experience),
        bio: Some(bio.to_string()),
        image: None,
        languages: languages.iter().map(|s| s.to_string()).collect(),
        consultation_fee: Some(fee),
        rating: Some(rating),
        is_active: true,
    };

    vec![
        doctor(
            "1", "Dr. Sarah Johnson", "MD, FACS", &["General ENT", "Pediatric ENT"], 15,
            "Comprehensive ENT care with a focus on pediatric patients.",
            &["English", "Spanish"], 250.0, 4.9,
        ),
        doctor(
            "2", "Dr. Michael Chen", "MD, PhD", &["Otology", "Audiology"], 20,
            "Hearing disorders and cochlear implants.",
            &["English", "Mandarin"], 300.0, 4.8,
        ),
        doctor(
            "3", "Dr. Emily Rodriguez", "MD, MS", &["Rhinology", "Allergy"], 12,
            "Sinus disorders and allergic conditions.",
            &["English", "Spanish", "Portuguese"], 275.0, 4.9,
        ),
    ]
}
