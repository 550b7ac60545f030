use std::sync::Arc;

use tracing::{info, warn};

use appointment_cell::{
    AppointmentRepository, AppointmentState, InMemoryAppointmentRepository,
    SupabaseAppointmentRepository,
};
use doctor_cell::{DoctorRepository, DoctorService, InMemoryDoctorRepository, SupabaseDoctorRepository};
use notification_cell::sender_from_config;
use shared_config::AppConfig;
use shared_database::SupabaseClient;

/// Everything the routers need, wired once at startup.
#[derive(Clone)]
pub struct ApiState {
    pub appointments: AppointmentState,
    pub doctors: Arc<DoctorService>,
}

impl ApiState {
    pub fn from_config(config: AppConfig) -> Self {
        let (appointments, doctors): (Arc<dyn AppointmentRepository>, Arc<dyn DoctorRepository>) =
            if config.is_store_configured() {
                info!("Using Supabase store at {}", config.supabase_url);
                let supabase = Arc::new(SupabaseClient::new(&config));
                (
                    Arc::new(SupabaseAppointmentRepository::new(Arc::clone(&supabase))),
                    Arc::new(SupabaseDoctorRepository::new(supabase)),
                )
            } else {
                warn!("Supabase is not configured, using in-memory appointments and the seeded doctor roster");
                (
                    Arc::new(InMemoryAppointmentRepository::new()),
                    Arc::new(InMemoryDoctorRepository::seeded()),
                )
            };

        let notifier = sender_from_config(&config);
        let config = Arc::new(config);

        Self {
            appointments: AppointmentState::new(config, appointments, Arc::clone(&doctors), notifier),
            doctors: Arc::new(DoctorService::new(doctors)),
        }
    }
}
