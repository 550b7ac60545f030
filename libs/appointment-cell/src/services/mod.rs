pub mod availability;
pub mod booking;
pub mod lifecycle;
pub mod reference;
pub mod repository;
pub mod slots;

pub use availability::AvailabilityService;
pub use booking::{AppointmentBookingService, BookingReceipt};
pub use lifecycle::AppointmentLifecycleService;
pub use repository::{
    AppointmentRepository, InMemoryAppointmentRepository, SupabaseAppointmentRepository,
};
