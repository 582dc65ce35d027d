pub mod booking_form;
pub mod calendar;
