use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tokio::task;

use crate::auth::password::{hash_password, verify_password};
use crate::config::SecurityConfig;
use crate::entities::{employees, prelude::*};

/// Employee data returned from the repository. The password hash never
/// leaves this module.
#[derive(Debug, Clone)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub username: String,
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<employees::Model> for Employee {
    fn from(model: employees::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            role: model.role,
            username: model.username,
            avatar: model.avatar,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub username: String,
    pub password: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

pub struct EmployeeRepository {
    conn: DatabaseConnection,
}

impl EmployeeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, role: Option<&str>) -> Result<Vec<Employee>> {
        let mut query = Employees::find().order_by_desc(employees::Column::CreatedAt);

        if let Some(role) = role {
            query = query.filter(employees::Column::Role.eq(role));
        }

        let rows = query
            .all(&self.conn)
            .await
            .context("Failed to list employees")?;

        Ok(rows.into_iter().map(Employee::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Employee>> {
        let employee = Employees::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query employee by ID")?;

        Ok(employee.map(Employee::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<Employee>> {
        let employee = Employees::find()
            .filter(employees::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query employee by username")?;

        Ok(employee.map(Employee::from))
    }

    /// Verify a password for a username.
    ///
    /// An unknown username verifies the same as a wrong password so callers
    /// cannot distinguish the two. Argon2 runs in `spawn_blocking` because
    /// it is CPU-intensive and would stall the async runtime.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<bool> {
        let employee = Employees::find()
            .filter(employees::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query employee for password verification")?;

        let Some(employee) = employee else {
            return Ok(false);
        };

        let password_hash = employee.password_hash;
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .context("Password verification task panicked")?;

        Ok(is_valid)
    }

    pub async fn create(&self, input: NewEmployee, config: &SecurityConfig) -> Result<Employee> {
        let password = input.password.clone();
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();
        let model = employees::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            role: Set(input.role),
            username: Set(input.username),
            password_hash: Set(password_hash),
            avatar: Set(input.avatar),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let inserted = model
            .insert(&self.conn)
            .await
            .context("Failed to insert employee")?;

        Ok(Employee::from(inserted))
    }

    pub async fn update(
        &self,
        id: &str,
        update: EmployeeUpdate,
        config: &SecurityConfig,
    ) -> Result<Option<Employee>> {
        let Some(existing) = Employees::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query employee for update")?
        else {
            return Ok(None);
        };

        let mut active: employees::ActiveModel = existing.into();

        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(email) = update.email {
            active.email = Set(email);
        }
        if let Some(phone) = update.phone {
            active.phone = Set(phone);
        }
        if let Some(role) = update.role {
            active.role = Set(role);
        }
        if let Some(username) = update.username {
            active.username = Set(username);
        }
        if let Some(avatar) = update.avatar {
            active.avatar = Set(Some(avatar));
        }
        if let Some(password) = update.password {
            let config = config.clone();
            let new_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
                .await
                .context("Password hashing task panicked")??;
            active.password_hash = Set(new_hash);
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update employee")?;

        Ok(Some(Employee::from(updated)))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = Employees::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete employee")?;

        Ok(result.rows_affected > 0)
    }
}
