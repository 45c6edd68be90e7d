//! Salon appointment scheduling server
//!
//! REST JSON API for booking salon appointments: conflict-free scheduling
//! per employee, free-slot lookup, the appointment status lifecycle and the
//! client visit metrics it feeds.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod scheduling;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
