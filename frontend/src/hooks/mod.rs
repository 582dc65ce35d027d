pub mod use_appointments;
