//! Pump assignment, point accounting and timed dispensing for a
//! self-service drink kiosk with six pumps.

pub mod api;
