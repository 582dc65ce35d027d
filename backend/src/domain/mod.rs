//! # Domain Module
//!
//! Booking rules that sit between the HTTP layer and storage.

pub mod availability_store;

pub use availability_store::{AvailabilityStore, BookingError};
