//! Employee and specialty models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Employee status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
        }
    }
}

impl std::str::FromStr for EmployeeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(EmployeeStatus::Active),
            "inactive" => Ok(EmployeeStatus::Inactive),
            _ => Err(format!("Invalid employee status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for EmployeeStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for EmployeeStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for EmployeeStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Employee record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: EmployeeStatus,
    /// Fallback commission percentage when no specialty rate applies
    #[schema(value_type = Option<String>)]
    pub commission_rate: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create employee request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEmployee {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub status: Option<EmployeeStatus>,
    /// Percentage, 0-100
    #[schema(value_type = Option<String>)]
    pub commission_rate: Option<Decimal>,
}

/// Update employee request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEmployee {
    #[validate(length(min = 1, max = 200, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub status: Option<EmployeeStatus>,
    #[schema(value_type = Option<String>)]
    pub commission_rate: Option<Decimal>,
}

/// Employee list parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    /// active or inactive
    pub status: Option<String>,
}

/// A service an employee performs, with their commission on it
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Specialty {
    pub employee_id: i32,
    pub service_id: i32,
    pub service_name: String,
    /// Percentage, 0-100
    #[schema(value_type = String)]
    pub commission_rate: Decimal,
}

/// Add or change a specialty
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetSpecialty {
    pub service_id: i32,
    #[schema(value_type = String)]
    pub commission_rate: Decimal,
}

/// Check that a commission percentage lies in 0-100
pub fn validate_commission_rate(rate: Decimal) -> Result<(), String> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        Err(format!("Commission rate must be between 0 and 100 (got {})", rate))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_rate_bounds() {
        assert!(validate_commission_rate(Decimal::ZERO).is_ok());
        assert!(validate_commission_rate(Decimal::new(455, 1)).is_ok());
        assert!(validate_commission_rate(Decimal::ONE_HUNDRED).is_ok());
        assert!(validate_commission_rate(Decimal::new(-1, 0)).is_err());
        assert!(validate_commission_rate(Decimal::new(101, 0)).is_err());
    }

    #[test]
    fn test_status_roundtrip_names() {
        assert_eq!("ACTIVE".parse::<EmployeeStatus>().unwrap(), EmployeeStatus::Active);
        assert_eq!(EmployeeStatus::Inactive.as_str(), "inactive");
    }
}
