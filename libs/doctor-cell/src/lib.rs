pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{Doctor, DoctorError, DoctorSearchQuery};
pub use router::doctor_routes;
pub use services::{
    DoctorRepository, DoctorService, InMemoryDoctorRepository, SupabaseDoctorRepository,
};
