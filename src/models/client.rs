//! Client model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Client record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Client {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Completed appointments
    pub total_visits: i32,
    /// Sum of completed appointment prices
    #[schema(value_type = String)]
    pub total_spent: Decimal,
    pub first_visit: Option<NaiveDate>,
    pub last_visit: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create client request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClient {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(max = 30, message = "Phone must be at most 30 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    /// Birth date (YYYY-MM-DD)
    pub birth_date: Option<String>,
    pub notes: Option<String>,
}

/// Update client request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClient {
    #[validate(length(min = 1, max = 200, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(max = 30, message = "Phone must be at most 30 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub birth_date: Option<String>,
    pub notes: Option<String>,
}

/// Client list parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ClientQuery {
    /// Matches name, phone or email
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
