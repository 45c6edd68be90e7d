//! Staff user accounts, roles and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Staff user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub login: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub role: Role,
    /// Linked employee record, for staff who take appointments
    pub employee_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, message = "Login must be at least 3 characters"))]
    pub login: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub role: Role,
    pub employee_id: Option<i32>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub employee_id: Option<i32>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_manager(&self) -> bool {
        matches!(self.role, Role::Owner | Role::Manager)
    }

    // Authorization checks
    pub fn require_owner(&self) -> Result<(), AppError> {
        if self.role == Role::Owner {
            Ok(())
        } else {
            Err(AppError::Authorization("Owner privileges required".to_string()))
        }
    }

    pub fn require_manager(&self) -> Result<(), AppError> {
        if self.is_manager() {
            Ok(())
        } else {
            Err(AppError::Authorization("Manager privileges required".to_string()))
        }
    }

    /// Managers act on any appointment; employees only on their own
    pub fn require_assigned(&self, employee_id: i32) -> Result<(), AppError> {
        if self.is_manager() || self.employee_id == Some(employee_id) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Appointment is assigned to another employee".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, employee_id: Option<i32>) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "ana".to_string(),
            user_id: 1,
            role,
            employee_id,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let c = claims(Role::Manager, None);
        let token = c.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 1);
        assert_eq!(parsed.role, Role::Manager);
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_role_checks() {
        assert!(claims(Role::Owner, None).require_manager().is_ok());
        assert!(claims(Role::Manager, None).require_manager().is_ok());
        assert!(claims(Role::Employee, Some(3)).require_manager().is_err());
        assert!(claims(Role::Manager, None).require_owner().is_err());
    }

    #[test]
    fn test_assignment_check() {
        let employee = claims(Role::Employee, Some(3));
        assert!(employee.require_assigned(3).is_ok());
        assert!(employee.require_assigned(4).is_err());
        assert!(claims(Role::Employee, None).require_assigned(3).is_err());
        assert!(claims(Role::Manager, None).require_assigned(4).is_ok());
    }
}
