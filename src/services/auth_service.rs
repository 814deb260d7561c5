//! Domain service for authentication.
//!
//! Owns the credential checks behind login and the current-user lookups.
//! Handlers depend on the trait, not the sea-orm implementation, so tests
//! can substitute a fake credential store.

use thiserror::Error;

use crate::db::{Employee, EmployeeUpdate};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username and wrong password collapse to this one variant so
    /// responses cannot leak which usernames exist.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the matching employee.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the username is
    /// unknown or the password is wrong — indistinguishably.
    async fn login(&self, username: &str, password: &str) -> Result<Employee, AuthError>;

    /// Loads the employee behind a verified session.
    async fn current_user(&self, employee_id: &str) -> Result<Employee, AuthError>;

    /// Updates the caller's own profile fields.
    async fn update_profile(
        &self,
        employee_id: &str,
        update: EmployeeUpdate,
    ) -> Result<Employee, AuthError>;
}
