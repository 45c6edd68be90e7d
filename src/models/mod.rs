//! Data models for the salon server

pub mod appointment;
pub mod client;
pub mod employee;
pub mod service;
pub mod user;

// Re-export commonly used types
pub use appointment::{Appointment, AppointmentDetails, AppointmentStatus};
pub use client::Client;
pub use employee::{Employee, EmployeeStatus, Specialty};
pub use service::Service;
pub use user::{Role, User, UserClaims};
