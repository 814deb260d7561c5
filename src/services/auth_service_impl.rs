//! `SeaORM` implementation of the [`AuthService`] trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::{Employee, EmployeeUpdate, Store};
use crate::services::auth_service::{AuthError, AuthService};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<Employee, AuthError> {
        let is_valid = self
            .store
            .verify_employee_credentials(username, password)
            .await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        // The row existed a moment ago; treat a miss here as the same
        // credential failure rather than leaking state
        self.store
            .get_employee_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn current_user(&self, employee_id: &str) -> Result<Employee, AuthError> {
        self.store
            .get_employee(employee_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn update_profile(
        &self,
        employee_id: &str,
        update: EmployeeUpdate,
    ) -> Result<Employee, AuthError> {
        if let Some(password) = &update.password
            && password.len() < 8
        {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        self.store
            .update_employee(employee_id, update, &self.security)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
