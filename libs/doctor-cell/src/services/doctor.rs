// libs/doctor-cell/src/services/doctor.rs
use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{Doctor, DoctorError, DoctorSearchQuery};
use crate::services::repository::DoctorRepository;

pub struct DoctorService {
    repository: Arc<dyn DoctorRepository>,
}

impl DoctorService {
    pub fn new(repository: Arc<dyn DoctorRepository>) -> Self {
        Self { repository }
    }

    /// Fetch a doctor regardless of active flag
    pub async fn get_doctor(&self, doctor_id: &str) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor profile: {}", doctor_id);

        self.repository
            .get_doctor_by_id(doctor_id)
            .await?
            .ok_or(DoctorError::NotFound)
    }

    /// Fetch a doctor that can currently take bookings. Inactive doctors are
    /// reported as not found.
    pub async fn get_active_doctor(&self, doctor_id: &str) -> Result<Doctor, DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;
        if !doctor.is_active {
            warn!("Doctor {} exists but is inactive", doctor_id);
            return Err(DoctorError::NotFound);
        }
        Ok(doctor)
    }

    pub async fn search_doctors(&self, query: &DoctorSearchQuery) -> Result<Vec<Doctor>, DoctorError> {
        let doctors = self.repository.list_doctors(query).await?;
        debug!("Found {} doctors for {:?}", doctors.len(), query);
        Ok(doctors)
    }
}
