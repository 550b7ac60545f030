pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    Appointment, AppointmentDetails, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    TimeSlot,
};
pub use router::{appointment_routes, availability_routes, AppointmentState};
pub use services::{
    AppointmentBookingService, AppointmentRepository, AvailabilityService, BookingReceipt,
    InMemoryAppointmentRepository, SupabaseAppointmentRepository,
};
