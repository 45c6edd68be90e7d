//! Authentication and staff user management

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Check login and password, return a JWT and the user
    pub async fn authenticate(&self, login: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_login(login)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid login or password".to_string()))?;

        if !verify_password(&user.password, password)? {
            tracing::info!(login, "Rejected login attempt");
            return Err(AppError::Authentication("Invalid login or password".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!(user_id = user.id, role = %user.role, "User logged in");
        Ok((token, user))
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.login.clone(),
            user_id: user.id,
            role: user.role,
            employee_id: user.employee_id,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Create a staff account.
    ///
    /// Only owners create owners and managers. An employee-role account must
    /// be linked to an employee record.
    pub async fn create_user(&self, creator: &UserClaims, data: CreateUser) -> AppResult<User> {
        data.validate()?;

        match data.role {
            Role::Owner | Role::Manager => creator.require_owner()?,
            Role::Employee => creator.require_manager()?,
        }

        match (data.role, data.employee_id) {
            (Role::Employee, None) => {
                return Err(AppError::Validation(
                    "employee_id is required for the employee role".to_string(),
                ));
            }
            (_, Some(employee_id)) => {
                self.repository.employees.get_by_id(employee_id).await?;
            }
            _ => {}
        }

        let hash = hash_password(&data.password)?;
        let user = self
            .repository
            .users
            .create(data.login.trim(), &hash, data.name.trim(), data.role, data.employee_id)
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, created_by = creator.user_id, "User created");
        Ok(user)
    }

    /// Create the configured owner account when no user exists yet
    pub async fn ensure_bootstrap_owner(&self) -> AppResult<()> {
        let (Some(login), Some(password)) = (
            self.config.bootstrap_login.as_deref(),
            self.config.bootstrap_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self.repository.users.count().await? > 0 {
            return Ok(());
        }

        let hash = hash_password(password)?;
        let user = self
            .repository
            .users
            .create(login, &hash, "Owner", Role::Owner, None)
            .await?;
        tracing::warn!(user_id = user.id, login, "Created bootstrap owner account");
        Ok(())
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_verifies() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "s3cret-pass").unwrap());
        assert!(!verify_password(&hash, "wrong").unwrap());
    }

    #[test]
    fn test_garbage_hash_is_internal_error() {
        assert!(matches!(verify_password("plain", "plain"), Err(AppError::Internal(_))));
    }
}
